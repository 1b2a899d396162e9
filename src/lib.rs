//! bbq-index — an in-memory binary-quantized vector index for approximate
//! nearest-neighbor search, following the Lucene "Better Binary
//! Quantization" family: index vectors quantized to 1 bit per dimension,
//! queries quantized to 4 bits (asymmetric, higher recall) or 1 bit
//! (fastest).

pub mod batch_dot;
pub mod bitutil;
pub mod bitwise_dot;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod packing;
pub mod parallel;
pub mod quantizer;
pub mod scorer;
pub mod search;
pub mod vector_ops;

pub use config::{Config, Similarity};
pub use error::{BbqError, Result};
pub use index::Index;
pub use quantizer::Corrections;
