use thiserror::Error;

#[derive(Error, Debug)]
pub enum GaImageError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Checkpoint error at line {line}: {message}")]
    Checkpoint { line: usize, message: String },

    #[error("Locus count mismatch: configuration expects {expected}, checkpoint has {found}")]
    LocusCountMismatch { expected: usize, found: usize },

    #[error("Invalid gene: {0}")]
    InvalidGene(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl GaImageError {
    pub fn checkpoint(line: usize, message: impl Into<String>) -> Self {
        GaImageError::Checkpoint {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GaImageError>;
