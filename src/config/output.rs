use super::traits::ConfigSection;
use crate::error::GaImageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_dir: PathBuf,
    /// Generations between progress snapshots
    pub log_stride: usize,
    /// Evolve r/g/b sub-populations independently and merge them
    pub run_separately: bool,
    pub checkpoint_file: String,
    pub restore_from_checkpoint: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            log_stride: 100,
            run_separately: true,
            checkpoint_file: "dump.txt".to_string(),
            restore_from_checkpoint: false,
        }
    }
}

impl OutputConfig {
    pub fn checkpoint_path(&self) -> PathBuf {
        self.results_dir.join(&self.checkpoint_file)
    }
}

impl ConfigSection for OutputConfig {
    fn section_name() -> &'static str {
        "output"
    }

    fn validate(&self) -> Result<(), GaImageError> {
        if self.log_stride == 0 {
            return Err(GaImageError::Configuration(
                "Log stride must be at least 1".to_string()
            ));
        }
        if self.checkpoint_file.is_empty() {
            return Err(GaImageError::Configuration(
                "Checkpoint file name cannot be empty".to_string()
            ));
        }
        Ok(())
    }
}
