//! Score reconstruction: turns an integer bit-dot result plus two
//! [`Corrections`] tuples back into an approximate similarity score.

use crate::config::Similarity;
use crate::quantizer::constants::FOUR_BIT_SCALE;
use crate::quantizer::Corrections;

/// Reconstruct a similarity score for one (query, target) pair.
///
/// `qc_dist` is the integer result of [`crate::bitwise_dot::int1_bit_dot`]
/// or [`crate::bitwise_dot::int4_bit_dot`]; `query_bits` says which one
/// produced it (1 or 4), selecting `k` in the `l_y` scaling below.
/// `centroid_dot_centroid` must be the stored centroid's self-dot computed
/// once at build time, never the live query's self-dot.
pub fn score(
    qc_dist: i32,
    query: &Corrections,
    target: &Corrections,
    query_bits: u8,
    dimension: usize,
    similarity: Similarity,
    centroid_dot_centroid: f32,
) -> f32 {
    let ax = target.lower_interval;
    let lx = target.upper_interval - ax;
    let x1 = target.quantized_component_sum;

    let ay = query.lower_interval;
    let ly_raw = query.upper_interval - ay;
    let ly = if query_bits == 4 { ly_raw * FOUR_BIT_SCALE } else { ly_raw };
    let y1 = query.quantized_component_sum;

    let ip = ax * ay * dimension as f32 + ay * lx * x1 + ax * ly * y1 + lx * ly * qc_dist as f32;

    match similarity {
        Similarity::Euclidean => {
            let d2 = query.additional_correction + target.additional_correction - 2.0 * ip;
            (1.0 / (1.0 + d2)).max(0.0)
        }
        Similarity::Cosine => {
            let cos =
                ip + query.additional_correction + target.additional_correction - centroid_dot_centroid;
            ((1.0 + cos) / 2.0).max(0.0)
        }
        Similarity::MaximumInnerProduct => {
            let adjusted =
                ip + query.additional_correction + target.additional_correction - centroid_dot_centroid;
            let k = if query_bits == 4 { FOUR_BIT_SCALE } else { 1.0 };
            scale_mip(adjusted, k)
        }
    }
}

/// `1/(1 - z/k)` for `z < 0`, else `z/k + 1`.
fn scale_mip(z: f32, k: f32) -> f32 {
    if z < 0.0 {
        1.0 / (1.0 - z / k)
    } else {
        z / k + 1.0
    }
}
