//! The immutable, post-build index container.

use tracing::{debug, info};

use crate::config::{Config, Similarity};
use crate::error::{BbqError, Result};
use crate::packing::{pack_as_binary, packed_len, transpose_half_byte};
use crate::quantizer::{Corrections, OptimizedScalarQuantizer};
use crate::vector_ops::{centroid, dot, normalize_in_place};

/// A single vector's quantized byte code plus its [`Corrections`].
pub struct QuantizedQuery {
    pub(crate) packed: Vec<u8>,
    pub(crate) corrections: Corrections,
    pub(crate) bits: u8,
}

/// Binary-quantized ANN index: a contiguous codes arena, a parallel
/// corrections array, and the build-time centroid. Immutable once built;
/// `Send + Sync` because nothing here is ever mutated after [`Index::build`]
/// returns.
pub struct Index {
    codes: Vec<u8>,
    corrections: Vec<Corrections>,
    centroid: Vec<f32>,
    centroid_dot_centroid: f32,
    similarity: Similarity,
    dimension: usize,
    stride: usize,
    config: Config,
}

impl Index {
    /// Build an index over `vectors`. Cosine similarity normalizes each
    /// input before centering; the centroid is the mean of those
    /// (possibly normalized) vectors.
    pub fn build(vectors: &[Vec<f32>], similarity: Similarity, config: Config) -> Result<Self> {
        config.validate()?;
        if vectors.is_empty() {
            return Err(BbqError::EmptyInput);
        }

        let dimension = vectors[0].len();
        let mut working: Vec<Vec<f32>> = Vec::with_capacity(vectors.len());
        for (vector_index, v) in vectors.iter().enumerate() {
            if v.len() != dimension {
                return Err(BbqError::DimensionMismatch {
                    expected: dimension,
                    actual: v.len(),
                });
            }
            for (dimension_index, &x) in v.iter().enumerate() {
                if !x.is_finite() {
                    return Err(BbqError::NonFiniteComponent {
                        vector_index,
                        dimension_index,
                    });
                }
            }
            let mut v = v.clone();
            if similarity == Similarity::Cosine {
                normalize_in_place(&mut v);
            }
            working.push(v);
        }

        let centroid_vec = centroid(&working)?;
        let centroid_dot_centroid = dot(&centroid_vec, &centroid_vec);

        let quantizer = OptimizedScalarQuantizer::new(config.lambda, config.iters, similarity);
        let stride = packed_len(dimension);

        let mut codes = vec![0u8; working.len() * stride];
        let mut corrections = Vec::with_capacity(working.len());
        let mut unpacked = vec![0u8; dimension];

        for (i, v) in working.iter().enumerate() {
            let c = quantizer.scalar_quantize(v, &centroid_vec, config.index_bits, &mut unpacked)?;
            pack_as_binary(&unpacked, &mut codes[i * stride..(i + 1) * stride]);
            corrections.push(c);
        }

        info!(
            vectors = working.len(),
            dimension,
            similarity = ?similarity,
            "built quantized index"
        );

        Ok(Self {
            codes,
            corrections,
            centroid: centroid_vec,
            centroid_dot_centroid,
            similarity,
            dimension,
            stride,
            config,
        })
    }

    /// Quantize `query` for search: optionally re-normalize (Cosine),
    /// center by the stored centroid, quantize to `query_bits` bits, then
    /// pack (1-bit) or transpose to bit-planes (4-bit).
    pub fn quantize_query(&self, query: &[f32]) -> Result<QuantizedQuery> {
        if query.len() != self.dimension {
            return Err(BbqError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        for (dimension_index, &x) in query.iter().enumerate() {
            if !x.is_finite() {
                return Err(BbqError::NonFiniteComponent {
                    vector_index: 0,
                    dimension_index,
                });
            }
        }

        let mut v = query.to_vec();
        if self.similarity == Similarity::Cosine {
            normalize_in_place(&mut v);
        }

        let quantizer = OptimizedScalarQuantizer::new(self.config.lambda, self.config.iters, self.similarity);
        let bits = self.config.query_bits;
        let mut unpacked = vec![0u8; self.dimension];
        let corrections = quantizer.scalar_quantize(&v, &self.centroid, bits, &mut unpacked)?;

        let packed = if bits == 4 {
            let mut out = vec![0u8; self.stride * 4];
            transpose_half_byte(&unpacked, &mut out);
            out
        } else {
            let mut out = vec![0u8; self.stride];
            pack_as_binary(&unpacked, &mut out);
            out
        };

        Ok(QuantizedQuery {
            packed,
            corrections,
            bits,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn size(&self) -> usize {
        self.corrections.len()
    }

    pub fn centroid(&self) -> &[f32] {
        &self.centroid
    }

    pub fn centroid_dot_centroid(&self) -> f32 {
        self.centroid_dot_centroid
    }

    pub fn similarity(&self) -> Similarity {
        self.similarity
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn packed_code(&self, i: usize) -> &[u8] {
        &self.codes[i * self.stride..(i + 1) * self.stride]
    }

    pub fn corrections(&self, i: usize) -> &Corrections {
        &self.corrections[i]
    }

    pub(crate) fn codes(&self) -> &[u8] {
        &self.codes
    }

    pub(crate) fn all_corrections(&self) -> &[Corrections] {
        &self.corrections
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        debug!(size = self.size(), dimension = self.dimension, "formatting Index");
        f.debug_struct("Index")
            .field("size", &self.size())
            .field("dimension", &self.dimension)
            .field("similarity", &self.similarity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vectors() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn build_rejects_empty_input() {
        let vectors: Vec<Vec<f32>> = vec![];
        let err = Index::build(&vectors, Similarity::Euclidean, Config::default()).unwrap_err();
        assert_eq!(err, BbqError::EmptyInput);
    }

    #[test]
    fn build_rejects_dimension_mismatch() {
        let vectors = vec![vec![1.0, 2.0], vec![1.0, 2.0, 3.0]];
        let err = Index::build(&vectors, Similarity::Euclidean, Config::default()).unwrap_err();
        assert!(matches!(err, BbqError::DimensionMismatch { .. }));
    }

    #[test]
    fn build_rejects_non_finite_components() {
        let vectors = vec![vec![1.0, f32::NAN], vec![1.0, 2.0]];
        let err = Index::build(&vectors, Similarity::Euclidean, Config::default()).unwrap_err();
        assert!(matches!(err, BbqError::NonFiniteComponent { .. }));
    }

    #[test]
    fn build_reports_correct_size_and_dimension() {
        let vectors = sample_vectors();
        let index = Index::build(&vectors, Similarity::Cosine, Config::default()).unwrap();
        assert_eq!(index.size(), 4);
        assert_eq!(index.dimension(), 4);
    }

    #[test]
    fn quantize_query_rejects_wrong_dimension() {
        let index = Index::build(&sample_vectors(), Similarity::Euclidean, Config::default()).unwrap();
        assert!(index.quantize_query(&[1.0, 2.0]).is_err());
    }
}
