pub mod gene;
pub mod shape;
pub mod chromosome;
pub mod operators;
pub mod population;
pub mod evolution_engine;
pub mod progress;

pub use gene::Gene;
pub use shape::{Geometry, Shape};
pub use chromosome::{Chromosome, BACKGROUND};
pub use population::Population;
pub use evolution_engine::{combine_channels, ChannelRun, EvolutionEngine, ProgressCallback, RunSummary};
pub use progress::{LogProgressCallback, SnapshotProgressCallback};
