pub mod checkpoint;
pub mod image_io;
pub mod snapshots;

pub use checkpoint::{read_population, write_population, PopulationDump};
pub use image_io::{load_target, save_png};
pub use snapshots::{write_summary, SnapshotWriter};
