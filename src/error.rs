//! Error types for the quantized index.

use thiserror::Error;

/// Errors surfaced at the `build`/`search` call boundary.
///
/// Inner kernels (`bitwise_dot`, `batch_dot`, `scorer`) take pre-validated
/// slices and never return errors; all shape/numeric checks happen once,
/// here, before those kernels ever run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BbqError {
    /// A vector's length didn't match the index dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// `build` was called with zero vectors.
    #[error("cannot build an index from an empty vector set")]
    EmptyInput,

    /// A component was NaN or infinite.
    #[error("non-finite component at vector {vector_index}, dimension {dimension_index}")]
    NonFiniteComponent {
        vector_index: usize,
        dimension_index: usize,
    },

    /// A `Config` field was out of its valid range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias for this crate's operations.
pub type Result<T> = std::result::Result<T, BbqError>;
