//! Error types for ragbot-vector.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, searching or persisting an index.
#[derive(Error, Debug)]
pub enum Error {
    /// Vector length does not match the index dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensions of the index.
        expected: usize,
        /// Dimensions of the offending vector.
        actual: usize,
    },

    /// Vector is empty or contains NaN/Inf.
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// No index was found at the given directory.
    #[error("No vector index found at {0}")]
    IndexNotFound(PathBuf),

    /// Serialization or format problem while saving/loading.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Invalid index configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
