//! Error types for road generation

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or empty configuration (profile weights, ranges, sizes).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation invoked before the state it depends on exists.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Index {index} out of range for path with {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
