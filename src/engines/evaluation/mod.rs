pub mod fitness;

pub use fitness::{PixelScorer, ScoreKind, TargetScorer};
