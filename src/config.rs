//! Build/query configuration.

use serde::{Deserialize, Serialize};

use crate::error::{BbqError, Result};

/// Similarity function an index is built and searched under.
///
/// An index built with one variant and searched as if it were another
/// produces numerically meaningless scores; this is a documented contract,
/// not a checked one (see `error` module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Similarity {
    Euclidean,
    Cosine,
    MaximumInnerProduct,
}

/// Quantization and search tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Bits used to quantize the query vector at search time: 1 or 4.
    pub query_bits: u8,
    /// Bits used to quantize stored vectors at build time. Fixed at 1 for
    /// the search path described here.
    pub index_bits: u8,
    /// Anisotropic loss weight, in `[0, 1]`.
    pub lambda: f32,
    /// Coordinate-descent refinement rounds.
    pub iters: u32,
    /// Kernel batch size; a performance knob only, never changes results.
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_bits: 4,
            index_bits: 1,
            lambda: 0.1,
            iters: 5,
            batch_size: 1024,
        }
    }
}

impl Config {
    /// Reject configs the quantizer/kernels can't act on.
    pub fn validate(&self) -> Result<()> {
        if self.query_bits != 1 && self.query_bits != 4 {
            return Err(BbqError::InvalidConfig(format!(
                "query_bits must be 1 or 4, got {}",
                self.query_bits
            )));
        }
        if self.index_bits != 1 {
            return Err(BbqError::InvalidConfig(format!(
                "index_bits must be 1, got {}",
                self.index_bits
            )));
        }
        if !(0.0..=1.0).contains(&self.lambda) {
            return Err(BbqError::InvalidConfig(format!(
                "lambda must be in [0, 1], got {}",
                self.lambda
            )));
        }
        if self.batch_size == 0 {
            return Err(BbqError::InvalidConfig(
                "batch_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
