//! Optimized Scalar Quantizer: anisotropic-loss interval optimization via
//! coordinate descent.
//!
//! Given a mean-centered vector and a target bit width, produces integer
//! components in `[0, 2^bits - 1]` plus the four [`Corrections`] scalars
//! needed to reconstruct an approximate score later.

pub mod constants;

use crate::config::Similarity;
use crate::error::{BbqError, Result};
use crate::vector_ops::{dot, mean_std, norm_squared, sub};
use constants::{DEFAULT_ITERS, DEFAULT_LAMBDA, EPSILON, MINIMUM_MSE_GRID, MIN_DETERMINANT};

/// The four correction scalars recorded per quantized vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corrections {
    /// Lower quantization bound after optimization (`a`).
    pub lower_interval: f32,
    /// Upper quantization bound after optimization (`b`).
    pub upper_interval: f32,
    /// `‖v−centroid‖²` for Euclidean, `⟨v−centroid, centroid⟩` otherwise.
    pub additional_correction: f32,
    /// Exact integer sum of quantized components, stored as `f32`.
    pub quantized_component_sum: f32,
}

/// Stateless coordinate-descent quantizer parameterized by `lambda`/`iters`.
#[derive(Debug, Clone, Copy)]
pub struct OptimizedScalarQuantizer {
    lambda: f32,
    iters: u32,
    similarity: Similarity,
}

impl OptimizedScalarQuantizer {
    pub fn new(lambda: f32, iters: u32, similarity: Similarity) -> Self {
        Self {
            lambda,
            iters,
            similarity,
        }
    }

    pub fn with_defaults(similarity: Similarity) -> Self {
        Self::new(DEFAULT_LAMBDA, DEFAULT_ITERS, similarity)
    }

    /// Quantize `vector` against `centroid` to `bits` bits per component.
    ///
    /// `destination` must have the same length as `vector`; each entry is
    /// written an integer value `< 2^bits`. Never fails for finite input of
    /// matching shape.
    pub fn scalar_quantize(
        &self,
        vector: &[f32],
        centroid: &[f32],
        bits: u8,
        destination: &mut [u8],
    ) -> Result<Corrections> {
        if vector.len() != centroid.len() {
            return Err(BbqError::DimensionMismatch {
                expected: centroid.len(),
                actual: vector.len(),
            });
        }
        if destination.len() != vector.len() {
            return Err(BbqError::DimensionMismatch {
                expected: vector.len(),
                actual: destination.len(),
            });
        }
        if !(1..=8).contains(&bits) {
            return Err(BbqError::InvalidConfig(format!(
                "bits must be in 1..=8, got {bits}"
            )));
        }

        let centroid_dot = if self.similarity == Similarity::Euclidean {
            0.0
        } else {
            dot(vector, centroid)
        };

        let working = sub(vector, centroid);
        let (mean, std) = mean_std(&working);
        let norm2 = norm_squared(&working);
        let min = working.iter().copied().fold(f32::MAX, f32::min);
        let max = working.iter().copied().fold(f32::MIN, f32::max);

        if norm2 == 0.0 {
            destination.fill(0);
            return Ok(Corrections {
                lower_interval: 0.0,
                upper_interval: 0.0,
                additional_correction: 0.0,
                quantized_component_sum: 0.0,
            });
        }

        let mut interval = Self::initial_interval(bits, std, mean, min, max)?;
        if std > 0.0 {
            self.optimize_interval(&mut interval, &working, norm2, 1i64 << bits);
        }

        let (a, b) = interval;
        let points = 1i64 << bits;
        let n_steps = (points - 1) as f32;
        let step = if n_steps > 0.0 { (b - a) / n_steps } else { 0.0 };
        let step_inv = if step > 0.0 { 1.0 / step } else { 0.0 };

        let mut sum = 0.0f32;
        if bits == 1 {
            let threshold = (a + b) / 2.0;
            for (dst, &x) in destination.iter_mut().zip(&working) {
                let clamped = x.clamp(a, b);
                let q = u8::from(clamped >= threshold);
                *dst = q;
                sum += f32::from(q);
            }
        } else {
            for (dst, &x) in destination.iter_mut().zip(&working) {
                let clamped = x.clamp(a, b);
                let assignment = ((clamped - a) * step_inv).round();
                let q = assignment.min(n_steps) as u8;
                *dst = q;
                sum += assignment;
            }
        }

        let additional_correction = if self.similarity == Similarity::Euclidean {
            norm2
        } else {
            centroid_dot
        };

        Ok(Corrections {
            lower_interval: a,
            upper_interval: b,
            additional_correction,
            quantized_component_sum: sum,
        })
    }

    fn initial_interval(bits: u8, std: f32, mean: f32, min: f32, max: f32) -> Result<(f32, f32)> {
        let grid = MINIMUM_MSE_GRID
            .get((bits - 1) as usize)
            .ok_or_else(|| BbqError::InvalidConfig(format!("no MSE grid entry for {bits} bits")))?;
        let g0 = grid[0] as f32;
        let g1 = grid[1] as f32;
        Ok(((g0 * std + mean).clamp(min, max), (g1 * std + mean).clamp(min, max)))
    }

    /// Two-variable coordinate descent on the anisotropic loss, `iters` rounds.
    fn optimize_interval(&self, interval: &mut (f32, f32), vector: &[f32], norm2: f32, points: i64) {
        let mut loss = self.loss(vector, *interval, points, norm2);
        let scale = (1.0 - self.lambda) / norm2;
        if !scale.is_finite() {
            return;
        }

        for _ in 0..self.iters {
            let (a, b) = *interval;
            if b <= a {
                return;
            }
            let step_inv = (points - 1) as f32 / (b - a);

            let mut daa = 0.0;
            let mut dab = 0.0;
            let mut dbb = 0.0;
            let mut dax = 0.0;
            let mut dbx = 0.0;

            for &x in vector {
                let clamped = x.clamp(a, b);
                let k = ((clamped - a) * step_inv).round();
                let s = k / (points - 1) as f32;

                daa += (1.0 - s) * (1.0 - s);
                dab += (1.0 - s) * s;
                dbb += s * s;
                dax += x * (1.0 - s);
                dbx += x * s;
            }

            let m0 = scale * dax * dax + self.lambda * daa;
            let m1 = scale * dax * dbx + self.lambda * dab;
            let m2 = scale * dbx * dbx + self.lambda * dbb;

            let det = m0 * m2 - m1 * m1;
            if det.abs() < MIN_DETERMINANT {
                return;
            }

            let a_opt = (m2 * dax - m1 * dbx) / det;
            let b_opt = (m0 * dbx - m1 * dax) / det;

            if (interval.0 - a_opt).abs() < EPSILON && (interval.1 - b_opt).abs() < EPSILON {
                return;
            }

            let new_loss = self.loss(vector, (a_opt, b_opt), points, norm2);
            if new_loss > loss {
                return;
            }

            *interval = (a_opt, b_opt);
            loss = new_loss;
        }
    }

    fn loss(&self, vector: &[f32], interval: (f32, f32), points: i64, norm2: f32) -> f32 {
        let (a, b) = interval;
        let step = (b - a) / (points - 1) as f32;
        let step_inv = if step != 0.0 { 1.0 / step } else { 0.0 };

        let mut xe = 0.0f32;
        let mut e = 0.0f32;
        for &x in vector {
            let clamped = x.clamp(a, b);
            let k = ((clamped - a) * step_inv).round();
            let xq = a + step * k;
            let diff = x - xq;
            xe += x * diff;
            e += diff * diff;
        }

        (1.0 - self.lambda) * xe * xe / norm2 + self.lambda * e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_bit_quantizes_by_threshold() {
        let quantizer = OptimizedScalarQuantizer::with_defaults(Similarity::Euclidean);
        let vector = vec![1.0, -1.0, 0.5, -0.5];
        let centroid = vec![0.0; 4];
        let mut dest = vec![0u8; 4];
        let corrections = quantizer
            .scalar_quantize(&vector, &centroid, 1, &mut dest)
            .unwrap();
        assert_eq!(dest, vec![1, 0, 1, 0]);
        assert_eq!(corrections.quantized_component_sum, 2.0);
    }

    #[test]
    fn zero_norm_vector_quantizes_to_all_zero() {
        let quantizer = OptimizedScalarQuantizer::with_defaults(Similarity::Euclidean);
        let vector = vec![0.0; 4];
        let centroid = vec![0.0; 4];
        let mut dest = vec![0u8; 4];
        let corrections = quantizer
            .scalar_quantize(&vector, &centroid, 1, &mut dest)
            .unwrap();
        assert_eq!(dest, vec![0, 0, 0, 0]);
        assert_eq!(corrections.lower_interval, 0.0);
        assert_eq!(corrections.upper_interval, 0.0);
    }

    #[test]
    fn quantized_component_sum_matches_exact_count() {
        let quantizer = OptimizedScalarQuantizer::with_defaults(Similarity::Cosine);
        let vector = vec![0.9, 0.1, -0.2, 0.4, -0.8, 0.3, 0.05, -0.6];
        let centroid = vec![0.1; 8];
        let mut dest = vec![0u8; 8];
        let corrections = quantizer
            .scalar_quantize(&vector, &centroid, 4, &mut dest)
            .unwrap();
        let expected: f32 = dest.iter().map(|&q| f32::from(q)).sum();
        assert_eq!(corrections.quantized_component_sum, expected);
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let quantizer = OptimizedScalarQuantizer::with_defaults(Similarity::Euclidean);
        let vector = vec![1.0, 2.0];
        let centroid = vec![0.0; 3];
        let mut dest = vec![0u8; 2];
        assert!(quantizer.scalar_quantize(&vector, &centroid, 1, &mut dest).is_err());
    }
}
