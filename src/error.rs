//! Error types for the HNSW index

use thiserror::Error;

/// Result type alias for HNSW index operations
pub type Result<T> = std::result::Result<T, HnswError>;

/// Error types that can occur in HNSW index operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HnswError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
