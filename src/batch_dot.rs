//! Batch dot-product kernels over a contiguous, concatenated code buffer.
//!
//! `N` target codes back-to-back give better cache locality than chasing
//! `N` separate allocations. [`batch_1bit_direct_packed`] provides a
//! straightforward per-byte loop; [`batch_1bit_direct_packed_unrolled`] is
//! the 8-way unrolled baseline whose output is the reference for the
//! batch-equivalence property test.

use crate::bitutil::popcount;
use crate::bitwise_dot::int1_bit_dot;

/// Pack `N` codes (selected by `indices` into `codes`) into one contiguous
/// buffer of `indices.len() * stride` bytes.
pub fn concat_codes(codes: &[u8], indices: &[u32], stride: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; indices.len() * stride];
    for (out_i, &idx) in indices.iter().enumerate() {
        let src_off = idx as usize * stride;
        let dst_off = out_i * stride;
        buffer[dst_off..dst_off + stride].copy_from_slice(&codes[src_off..src_off + stride]);
    }
    buffer
}

/// `int1_bit_dot(query_packed, buffer[i*stride..(i+1)*stride])` for each of
/// `n` targets, scalar byte loop.
pub fn batch_1bit_direct_packed(query_packed: &[u8], buffer: &[u8], n: usize, stride: usize) -> Vec<i32> {
    debug_assert_eq!(buffer.len(), n * stride);
    (0..n)
        .map(|i| int1_bit_dot(query_packed, &buffer[i * stride..(i + 1) * stride]))
        .collect()
}

/// 8-way unrolled baseline for [`batch_1bit_direct_packed`]: processes one
/// packed byte (8 components) per unrolled step instead of delegating to
/// [`int1_bit_dot`]. Required to return results bit-identical to the
/// straightforward variant (see property 4 in the test suite).
pub fn batch_1bit_direct_packed_unrolled(
    query_packed: &[u8],
    buffer: &[u8],
    n: usize,
    stride: usize,
) -> Vec<i32> {
    debug_assert_eq!(buffer.len(), n * stride);
    let mut results = vec![0i32; n];
    for (i, result) in results.iter_mut().enumerate() {
        let target = &buffer[i * stride..(i + 1) * stride];
        let mut sum = 0u32;
        let chunks = stride / 4;
        for c in 0..chunks {
            let off = c * 4;
            sum += popcount(query_packed[off] & target[off]) as u32;
            sum += popcount(query_packed[off + 1] & target[off + 1]) as u32;
            sum += popcount(query_packed[off + 2] & target[off + 2]) as u32;
            sum += popcount(query_packed[off + 3] & target[off + 3]) as u32;
        }
        for off in chunks * 4..stride {
            sum += popcount(query_packed[off] & target[off]) as u32;
        }
        *result = sum as i32;
    }
    results
}

/// Batch variant of [`crate::bitwise_dot::int4_bit_dot`]: a transposed
/// 4-bit query against `n` packed 1-bit targets, `stride` bytes each.
pub fn batch_4bit_direct_packed(
    query_transposed: &[u8],
    buffer: &[u8],
    n: usize,
    stride: usize,
) -> Vec<i32> {
    debug_assert_eq!(query_transposed.len(), stride * 4);
    debug_assert_eq!(buffer.len(), n * stride);

    let mut results = vec![0i32; n];
    for (i, result) in results.iter_mut().enumerate() {
        let target = &buffer[i * stride..(i + 1) * stride];
        let mut total = 0i64;
        for plane in 0..4 {
            let plane_bytes = &query_transposed[plane * stride..(plane + 1) * stride];
            let mut sum = 0u32;
            for (&qb, &db) in plane_bytes.iter().zip(target) {
                sum += popcount(qb & db);
            }
            total += (sum as i64) << plane;
        }
        *result = total as i32;
    }
    results
}
