//! Brute-force top-K search over a [`Index`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::batch_dot::{batch_1bit_direct_packed_unrolled, batch_4bit_direct_packed};
use crate::error::Result;
use crate::index::Index;
use crate::scorer::score;

/// A scored candidate, ordered by score so a [`BinaryHeap`] can act as a
/// size-bounded min-heap (pop the smallest to make room for a larger one).
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScoredCandidate {
    score: f32,
    ordinal: u32,
}

impl Eq for ScoredCandidate {}

impl Ord for ScoredCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ScoredCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Index {
    /// Return the `k` nearest vectors to `query` as `(ordinal, score)`
    /// pairs, sorted by descending score. `k = 0` or an empty index return
    /// an empty vector.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        debug!(k, dimension = query.len(), "searching index");

        if k == 0 || self.size() == 0 {
            return Ok(Vec::new());
        }

        let quantized = self.quantize_query(query)?;
        let stride = self.stride();
        let n = self.size();
        let batch_size = self.config().batch_size.max(1);

        let qc_dists: Vec<i32> = if quantized.bits == 4 {
            (0..n)
                .collect::<Vec<_>>()
                .chunks(batch_size)
                .flat_map(|chunk| {
                    let start = chunk[0];
                    let buffer = &self.codes()[start * stride..(start + chunk.len()) * stride];
                    batch_4bit_direct_packed(&quantized.packed, buffer, chunk.len(), stride)
                })
                .collect()
        } else {
            (0..n)
                .collect::<Vec<_>>()
                .chunks(batch_size)
                .flat_map(|chunk| {
                    let start = chunk[0];
                    let buffer = &self.codes()[start * stride..(start + chunk.len()) * stride];
                    batch_1bit_direct_packed_unrolled(&quantized.packed, buffer, chunk.len(), stride)
                })
                .collect()
        };

        let mut heap: BinaryHeap<ScoredCandidate> = BinaryHeap::with_capacity(k + 1);
        for (ordinal, &qc_dist) in qc_dists.iter().enumerate() {
            let target_corrections = &self.all_corrections()[ordinal];
            let s = score(
                qc_dist,
                &quantized.corrections,
                target_corrections,
                quantized.bits,
                self.dimension(),
                self.similarity(),
                self.centroid_dot_centroid(),
            );

            let candidate = ScoredCandidate {
                score: s,
                ordinal: ordinal as u32,
            };
            if heap.len() < k {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if s > worst.score {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        let mut results: Vec<(u32, f32)> = heap.into_iter().map(|c| (c.ordinal, c.score)).collect();
        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Ok(results)
    }
}
