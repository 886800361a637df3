pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use config::{AppConfig, ConfigManager};
pub use engines::evaluation::{PixelScorer, ScoreKind, TargetScorer};
pub use engines::generation::{Chromosome, EvolutionEngine, Gene, Population, RunSummary, Shape};
pub use error::{GaImageError, Result};
pub use types::{ColorChannel, Locus, LocusMode};
