use gaimage::config::AppConfig;
use gaimage::engines::evaluation::{PixelScorer, TargetScorer};
use gaimage::engines::generation::{EvolutionEngine, LogProgressCallback, Population};
use gaimage::error::GaImageError;
use gaimage::types::LocusMode;
use image::{Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

fn create_test_config(mode: LocusMode) -> AppConfig {
    let mut config = AppConfig::default();
    config.canvas.width = 12;
    config.canvas.height = 12;
    config.canvas.shape_size_min = 2.0;
    config.canvas.shape_size_max = 6.0;
    config.canvas.locus_mode = mode;
    config.evolution.population_size = 6;
    config.evolution.elite_count = 2;
    config.evolution.gene_count = 5;
    config.evolution.generations = 6;
    config.evolution.seed = Some(77);
    config
}

fn scorer_for(mode: LocusMode) -> impl Fn(&str) -> Arc<dyn PixelScorer> {
    let target = Arc::new(RgbaImage::from_pixel(12, 12, Rgba([40, 90, 200, 255])));
    move |name: &str| Arc::new(TargetScorer::for_population(Arc::clone(&target), name, mode)) as Arc<dyn PixelScorer>
}

fn dump_to_bytes(population: &Population) -> Vec<u8> {
    let mut out = Vec::new();
    population.dump(&mut out).unwrap();
    out
}

#[test]
fn test_dump_restore_is_exact() {
    let config = Arc::new(create_test_config(LocusMode::Colored));
    let scorer = scorer_for(LocusMode::Colored);
    let mut population = Population::new(Arc::clone(&config), "b", scorer("b")).unwrap();
    population.next();
    population.next();
    population.next();

    let bytes = dump_to_bytes(&population);
    let restored = Population::restore(Cursor::new(bytes), config, &scorer).unwrap();

    assert_eq!(restored.name(), "b");
    assert_eq!(restored.generation(), 3);
    assert_eq!(restored.len(), population.len());
    for (a, b) in population.individuals().iter().zip(restored.individuals()) {
        assert_eq!(a.len(), b.len());
        for (ga, gb) in a.genes().iter().zip(b.genes()) {
            let bits_a: Vec<u64> = ga.loci().iter().map(|v| v.to_bits()).collect();
            let bits_b: Vec<u64> = gb.loci().iter().map(|v| v.to_bits()).collect();
            assert_eq!(bits_a, bits_b);
        }
    }
}

#[test]
fn test_restored_population_is_unevaluated_and_scores_the_same() {
    let config = Arc::new(create_test_config(LocusMode::Monochrome));
    let scorer = scorer_for(LocusMode::Monochrome);
    let mut population = Population::new(Arc::clone(&config), "", scorer("")).unwrap();
    let best = population.best_fitness();

    let bytes = dump_to_bytes(&population);
    let mut restored = Population::restore(Cursor::new(bytes), config, &scorer).unwrap();

    assert!(restored.individuals().iter().all(|c| !c.is_evaluated()));
    assert_eq!(restored.best_fitness(), best);
}

#[test]
fn test_restored_run_continues_to_target() {
    let config = Arc::new(create_test_config(LocusMode::Monochrome));
    let scorer = scorer_for(LocusMode::Monochrome);
    let mut population = Population::new(Arc::clone(&config), "", scorer("")).unwrap();
    population.next();
    population.next();

    let bytes = dump_to_bytes(&population);
    let mut restored = Population::restore(Cursor::new(bytes), Arc::clone(&config), &scorer).unwrap();
    let summary = EvolutionEngine::new(config)
        .run(&mut restored, &mut LogProgressCallback::new(false))
        .unwrap();

    assert_eq!(summary.start_generation, 2);
    assert_eq!(summary.final_generation, 6);
    assert_eq!(summary.generations_run(), 4);
}

#[test]
fn test_locus_count_mismatch_is_rejected() {
    let colored = Arc::new(create_test_config(LocusMode::Colored));
    let population = Population::new(colored, "", scorer_for(LocusMode::Colored)("")).unwrap();
    let bytes = dump_to_bytes(&population);

    let monochrome = Arc::new(create_test_config(LocusMode::Monochrome));
    let result = Population::restore(Cursor::new(bytes), monochrome, scorer_for(LocusMode::Monochrome));
    assert!(matches!(
        result,
        Err(GaImageError::LocusCountMismatch { expected: 7, found: 10 })
    ));
}

#[test]
fn test_gene_count_mismatch_is_rejected() {
    let mut longer = create_test_config(LocusMode::Monochrome);
    longer.evolution.gene_count = 9;
    let population = Population::new(Arc::new(longer), "", scorer_for(LocusMode::Monochrome)("")).unwrap();
    let bytes = dump_to_bytes(&population);

    let config = Arc::new(create_test_config(LocusMode::Monochrome));
    let result = Population::restore(Cursor::new(bytes), config, scorer_for(LocusMode::Monochrome));
    assert!(matches!(result, Err(GaImageError::Configuration(_))));
}

#[test]
fn test_population_size_mismatch_is_rejected() {
    let mut bigger = create_test_config(LocusMode::Monochrome);
    bigger.evolution.population_size = 9;
    let population = Population::new(Arc::new(bigger), "", scorer_for(LocusMode::Monochrome)("")).unwrap();
    let bytes = dump_to_bytes(&population);

    let config = Arc::new(create_test_config(LocusMode::Monochrome));
    let result = Population::restore(Cursor::new(bytes), config, scorer_for(LocusMode::Monochrome));
    assert!(matches!(result, Err(GaImageError::Configuration(_))));
}

#[test]
fn test_malformed_checkpoint_reports_line() {
    let config = Arc::new(create_test_config(LocusMode::Monochrome));
    let text = "name:\ngeneration:two\nsize:0\n";
    let result = Population::restore(Cursor::new(text), config, scorer_for(LocusMode::Monochrome));
    assert!(matches!(result, Err(GaImageError::Checkpoint { line: 2, .. })));
}
