//! Error type shared by model loading, validation and inference.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    /// The artifact was trained on a different column layout than the one
    /// the dashboard assembles.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Only binary models with classes `[0, 1]` (1 = tsunami) are supported.
    #[error("unsupported class labels {0:?}: expected [0, 1]")]
    UnsupportedClasses(Vec<i64>),

    #[error("invalid estimator: {0}")]
    InvalidEstimator(String),

    #[error("expected {expected} input features, got {found}")]
    FeatureCount { expected: usize, found: usize },

    #[error("model returned {0} class probabilities, expected 2")]
    ProbabilityShape(usize),
}

pub type Result<T> = std::result::Result<T, ModelError>;
