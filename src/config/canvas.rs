use super::traits::ConfigSection;
use crate::error::GaImageError;
use crate::types::LocusMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub shape_size_min: f64,
    pub shape_size_max: f64,
    pub use_alpha: bool,
    pub locus_mode: LocusMode,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            shape_size_min: 4.0,
            shape_size_max: 30.0,
            use_alpha: true,
            locus_mode: LocusMode::Monochrome,
        }
    }
}

impl CanvasConfig {
    pub fn locus_count(&self) -> usize {
        self.locus_mode.locus_count()
    }

    /// Map a [0,1] size locus onto [shape_size_min, shape_size_max]
    pub fn shape_extent(&self, locus: f64) -> f64 {
        locus * (self.shape_size_max - self.shape_size_min) + self.shape_size_min
    }
}

impl ConfigSection for CanvasConfig {
    fn section_name() -> &'static str {
        "canvas"
    }

    fn validate(&self) -> Result<(), GaImageError> {
        if self.width == 0 || self.height == 0 {
            return Err(GaImageError::Configuration(
                "Canvas dimensions must be positive".to_string()
            ));
        }
        if self.shape_size_min <= 0.0 {
            return Err(GaImageError::Configuration(
                "Minimum shape size must be positive".to_string()
            ));
        }
        if self.shape_size_max < self.shape_size_min {
            return Err(GaImageError::Configuration(format!(
                "Maximum shape size ({}) is below minimum ({})",
                self.shape_size_max, self.shape_size_min
            )));
        }
        Ok(())
    }
}
