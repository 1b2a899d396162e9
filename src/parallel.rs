//! Read-only parallel fan-out over an immutable [`Index`].
//!
//! Additive sugar over [`Index::search`], not a new concurrency primitive:
//! every element of the returned `Vec` is exactly what `Index::search`
//! would produce run alone against the same query.

use once_cell::sync::OnceCell;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::warn;

use crate::error::Result;
use crate::index::Index;

/// Dedicated pool for batch queries, separate from rayon's global pool so a
/// host application's own rayon usage isn't starved by large query batches.
static SEARCH_POOL: OnceCell<ThreadPool> = OnceCell::new();

fn build_pool(num_threads: usize) -> std::result::Result<ThreadPool, rayon::ThreadPoolBuildError> {
    let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("bbq-search-{i}"));
    if num_threads > 0 {
        builder = builder.num_threads(num_threads);
    }
    builder.build()
}

fn search_pool() -> Option<&'static ThreadPool> {
    SEARCH_POOL
        .get_or_try_init(|| build_pool(0).or_else(|_| build_pool(1)))
        .map_err(|e| warn!(error = %e, "no thread pool available, running batch search on the calling thread"))
        .ok()
}

impl Index {
    /// Score `queries` concurrently against this index, on a pool dedicated
    /// to search rather than rayon's global default. Falls back to running
    /// on the calling thread if the dedicated pool could never be built.
    pub fn search_batch_parallel(&self, queries: &[Vec<f32>], k: usize) -> Vec<Result<Vec<(u32, f32)>>> {
        use rayon::prelude::*;
        match search_pool() {
            Some(pool) => pool.install(|| queries.par_iter().map(|q| self.search(q, k)).collect()),
            None => queries.iter().map(|q| self.search(q, k)).collect(),
        }
    }
}
