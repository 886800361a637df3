pub mod traits;
pub mod evolution;
pub mod canvas;
pub mod output;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::{EvolutionConfig, SelectionMethod, GeneMutation, CrossoverBias};
pub use canvas::CanvasConfig;
pub use output::OutputConfig;
pub use traits::ConfigSection;
