use crate::data::image_io::save_png;
use crate::engines::generation::{Population, RunSummary};
use crate::error::Result;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Archival snapshots are kept for every logged step below this one
const EARLY_ARCHIVE_STEPS: usize = 1000;

/// Writes the survivor of a population to disk every `stride` steps.
///
/// `<dir>/<name>current.png` is overwritten each time. An archival copy named
/// after the generation and the scaled fitness is also kept early in the run
/// and every tenth logged step after that.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
    stride: usize,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, stride: usize) -> Self {
        Self {
            dir: dir.into(),
            stride: stride.max(1),
        }
    }

    pub fn should_write(&self, step: usize) -> bool {
        step % self.stride == 0
    }

    pub fn should_archive(&self, step: usize) -> bool {
        step < EARLY_ARCHIVE_STEPS || step % (self.stride * 10) == 0
    }

    pub fn current_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}current.png", name))
    }

    pub fn archive_path(&self, name: &str, generation: usize, fitness: f64) -> PathBuf {
        let scaled = (fitness / 1e5) as u64;
        self.dir.join(format!("{}{:05}-{:05}.png", name, generation, scaled))
    }

    /// Returns the paths written, empty when `step` is off-stride. A survivor
    /// with out-of-range genes aborts the run.
    pub fn write(&self, step: usize, population: &mut Population) -> Result<Vec<PathBuf>> {
        if !self.should_write(step) {
            return Ok(Vec::new());
        }

        population.survivor().check_genes()?;
        let name = population.name().to_string();
        let generation = population.generation();
        let fitness = population.best_fitness();
        let image = population.survivor_phenotype();

        let mut written = vec![self.current_path(&name)];
        if self.should_archive(step) {
            written.push(self.archive_path(&name, generation, fitness));
        }
        for path in &written {
            save_png(image, path)?;
        }
        Ok(written)
    }
}

/// Write `<dir>/<name>summary.json`
pub fn write_summary(summary: &RunSummary, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}summary.json", summary.name));
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(path)
}
