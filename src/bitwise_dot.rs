//! Single-pair bitwise dot-product kernels: AND + popcount.
//!
//! Both kernels take pre-validated, equal-stride slices and never check
//! shape — validation happens once at the `build`/`search` boundary.

use crate::bitutil::{load_be_u32, popcount};

/// `Σ popcount(q[i] AND d[i])` over two packed 1-bit codes of equal length:
/// the count of dimensions where both components are 1.
pub fn int1_bit_dot(q: &[u8], d: &[u8]) -> i32 {
    debug_assert_eq!(q.len(), d.len());
    and_popcount_sum(q, d) as i32
}

/// `Σ_p 2^p · popcount(q_plane_p[i] AND d[i])` for a transposed 4-bit query
/// (`4 * stride` bytes) against a packed 1-bit code (`stride` bytes).
///
/// Equals `Σᵢ q4ᵢ · dᵢ` where `q4ᵢ ∈ [0,15]` is the original unpacked 4-bit
/// component — see property 2 in the test suite.
pub fn int4_bit_dot(q_transposed: &[u8], d: &[u8]) -> i32 {
    let stride = d.len();
    debug_assert_eq!(q_transposed.len(), stride * 4);

    let mut total = 0i64;
    for plane in 0..4 {
        let plane_bytes = &q_transposed[plane * stride..(plane + 1) * stride];
        total += (and_popcount_sum(plane_bytes, d) as i64) << plane;
    }
    total as i32
}

/// `Σ popcount(a[i] AND b[i])`, using big-endian 32-bit loads over the
/// aligned prefix and a byte-wise tail.
fn and_popcount_sum(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    let mut sum = 0u32;
    let mut i = 0;
    while i + 4 <= a.len() {
        let aw = load_be_u32(&a[i..i + 4]);
        let bw = load_be_u32(&b[i..i + 4]);
        sum += popcount(aw & bw);
        i += 4;
    }
    while i < a.len() {
        sum += popcount(u32::from(a[i] & b[i]));
        i += 1;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packing::{pack_as_binary, packed_len, transpose_half_byte};

    #[test]
    fn int1_bit_dot_counts_shared_ones() {
        let q = [0b1111_0000u8];
        let d = [0b1100_1100u8];
        // AND = 1100_0000 -> 2 bits set
        assert_eq!(int1_bit_dot(&q, &d), 2);
    }

    #[test]
    fn int4_bit_dot_matches_plain_weighted_sum() {
        let q4 = vec![15u8, 15, 15, 15, 15, 15, 15, 15];
        let d_bits = vec![1u8, 1, 1, 1, 1, 1, 1, 1];
        let stride = packed_len(8);
        let mut d_packed = vec![0u8; stride];
        pack_as_binary(&d_bits, &mut d_packed);
        let mut q_transposed = vec![0u8; stride * 4];
        transpose_half_byte(&q4, &mut q_transposed);

        assert_eq!(int4_bit_dot(&q_transposed, &d_packed), 8 * 15);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property 1: int1_bit_dot is the popcount of the AND of its inputs.
        #[test]
        fn popcount_identity(bytes_q in prop::collection::vec(any::<u8>(), 1..40),
                              bytes_d in prop::collection::vec(any::<u8>(), 1..40)) {
            let len = bytes_q.len().min(bytes_d.len());
            let q = &bytes_q[..len];
            let d = &bytes_d[..len];
            let expected: u32 = q.iter().zip(d).map(|(&a, &b)| (a & b).count_ones()).sum();
            prop_assert_eq!(int1_bit_dot(q, d), expected as i32);
        }

        /// Property 2: int4_bit_dot equals the plain weighted sum Σ uᵢ·vᵢ for
        /// any unpacked 4-bit vector u and 1-bit vector v.
        #[test]
        fn four_bit_weighted_identity(u in prop::collection::vec(0u8..16, 1..80),
                                       v in prop::collection::vec(0u8..2, 1..80)) {
            let dim = u.len().min(v.len());
            let u = &u[..dim];
            let v = &v[..dim];

            let stride = packed_len(dim);
            let mut d_packed = vec![0u8; stride];
            pack_as_binary(v, &mut d_packed);
            let mut q_transposed = vec![0u8; stride * 4];
            transpose_half_byte(u, &mut q_transposed);

            let expected: i32 = u.iter().zip(v).map(|(&a, &b)| i32::from(a) * i32::from(b)).sum();
            prop_assert_eq!(int4_bit_dot(&q_transposed, &d_packed), expected);
        }
    }
}
