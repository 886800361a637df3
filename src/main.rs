use anyhow::{Context, Result};
use clap::Parser;
use gaimage::config::{AppConfig, ConfigManager};
use gaimage::data::{self, SnapshotWriter};
use gaimage::engines::evaluation::{PixelScorer, TargetScorer};
use gaimage::engines::generation::{
    EvolutionEngine, Population, ProgressCallback, SnapshotProgressCallback,
};
use gaimage::types::ColorChannel;
use image::RgbaImage;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "gaimage")]
#[command(about = "Approximate an image with evolved rectangles and circles")]
struct Args {
    /// Target image
    target: PathBuf,

    /// Config file (TOML or JSON)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Number of generations to run
    #[arg(short = 'g', long = "generation")]
    generations: Option<usize>,

    /// Output directory (overrides config)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Evolve r/g/b channels as separate populations
    #[arg(long, conflicts_with = "combined")]
    separately: bool,

    /// Evolve a single population
    #[arg(long)]
    combined: bool,

    /// Resume a single-population run from the checkpoint
    #[arg(long)]
    restore: bool,

    /// Write the effective configuration to this file before running
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("rayon-{}", i))
        .build_global()
    {
        log::warn!("Using the default rayon pool: {}", e);
    }

    let args = Args::parse();
    let config = load_config(&args)?;
    log::info!(
        "population {} x {} genes, {} generations, {:?} loci",
        config.evolution.population_size,
        config.evolution.gene_count,
        config.evolution.generations,
        config.canvas.locus_mode
    );

    let results_dir = config.output.results_dir.clone();
    fs::create_dir_all(&results_dir)
        .with_context(|| format!("Failed to create {}", results_dir.display()))?;

    let target = data::load_target(&args.target, &config.canvas)
        .with_context(|| format!("Failed to load target {}", args.target.display()))?;
    let target = Arc::new(target);

    let engine = EvolutionEngine::new(Arc::clone(&config));
    if config.output.run_separately {
        run_separately(&engine, &config, target)
    } else {
        run_single(&engine, &config, target)
    }
}

fn load_config(args: &Args) -> Result<Arc<AppConfig>> {
    let mut manager = ConfigManager::new();
    match &args.config {
        Some(path) => manager
            .load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => manager.load_from_env().context("Failed to read config from environment")?,
    }

    manager.update(|config| {
        if let Some(generations) = args.generations {
            config.evolution.generations = generations;
        }
        if let Some(seed) = args.seed {
            config.evolution.seed = Some(seed);
        }
        if let Some(dir) = &args.output {
            config.output.results_dir = dir.clone();
        }
        if args.separately {
            config.output.run_separately = true;
        }
        if args.combined {
            config.output.run_separately = false;
        }
        if args.restore {
            config.output.restore_from_checkpoint = true;
        }
    })?;

    if let Some(path) = &args.write_config {
        manager
            .save_to_file(path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        log::info!("Wrote configuration to {}", path.display());
    }

    Ok(manager.freeze())
}

fn run_single(engine: &EvolutionEngine, config: &Arc<AppConfig>, target: Arc<RgbaImage>) -> Result<()> {
    engine.check_target(&target)?;
    let mode = config.canvas.locus_mode;
    let checkpoint_path = config.output.checkpoint_path();

    let mut population = if config.output.restore_from_checkpoint {
        let file = File::open(&checkpoint_path)
            .with_context(|| format!("Failed to open checkpoint {}", checkpoint_path.display()))?;
        let population = Population::restore(BufReader::new(file), Arc::clone(config), |name| {
            Arc::new(TargetScorer::for_population(Arc::clone(&target), name, mode)) as Arc<dyn PixelScorer>
        })
        .with_context(|| format!("Failed to restore {}", checkpoint_path.display()))?;
        log::info!(
            "Restored '{}' at generation {}",
            population.name(),
            population.generation()
        );
        population
    } else {
        let scorer: Arc<dyn PixelScorer> = Arc::new(TargetScorer::for_population(target, "", mode));
        Population::new(Arc::clone(config), "", scorer)?
    };

    let writer = SnapshotWriter::new(&config.output.results_dir, config.output.log_stride);
    let mut callback = SnapshotProgressCallback::new(true, writer);
    let summary = engine.run(&mut population, &mut callback)?;

    let last = config.output.results_dir.join("last.png");
    data::save_png(population.survivor_phenotype(), &last)?;

    let mut out = BufWriter::new(
        File::create(&checkpoint_path)
            .with_context(|| format!("Failed to create checkpoint {}", checkpoint_path.display()))?,
    );
    population.dump(&mut out)?;

    let summary_path = data::write_summary(&summary, &config.output.results_dir)?;
    log::info!(
        "Finished at generation {} with best fitness {}; wrote {}, {} and {}",
        summary.final_generation,
        summary.best_fitness,
        last.display(),
        checkpoint_path.display(),
        summary_path.display()
    );
    Ok(())
}

fn run_separately(engine: &EvolutionEngine, config: &Arc<AppConfig>, target: Arc<RgbaImage>) -> Result<()> {
    let dir = config.output.results_dir.clone();
    let stride = config.output.log_stride;
    if config.output.restore_from_checkpoint {
        log::warn!("Checkpoint restore only applies to single-population runs; starting fresh");
    }

    let run = engine.run_separately(target, |channel| {
        let writer = SnapshotWriter::new(&dir, stride);
        // red reports for all three
        Box::new(SnapshotProgressCallback::new(channel == ColorChannel::Red, writer)) as Box<dyn ProgressCallback>
    })?;

    let result = dir.join("result.png");
    data::save_png(&run.image, &result)?;

    for (population, summary) in run.populations.iter().zip(&run.summaries) {
        let path = dir.join(format!("{}{}", population.name(), config.output.checkpoint_file));
        let mut out = BufWriter::new(
            File::create(&path).with_context(|| format!("Failed to create checkpoint {}", path.display()))?,
        );
        population.dump(&mut out)?;
        data::write_summary(summary, &dir)?;
    }

    log::info!("Finished channel runs; wrote {}", result.display());
    Ok(())
}
