//! End-to-end build + search benchmarks.

use bbq_index::{Config, Index, Similarity};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn random_vectors(rng: &mut fastrand::Rng, n: usize, dimension: usize) -> Vec<Vec<f32>> {
    (0..n)
        .map(|_| (0..dimension).map(|_| rng.f32() * 2.0 - 1.0).collect())
        .collect()
}

fn benchmark_build(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(3);
    let vectors = random_vectors(&mut rng, 5_000, 768);

    c.bench_function("build_5000x768", |b| {
        b.iter(|| Index::build(black_box(&vectors), Similarity::Cosine, Config::default()).unwrap());
    });
}

fn benchmark_search(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(4);
    let vectors = random_vectors(&mut rng, 10_000, 768);
    let index = Index::build(&vectors, Similarity::Cosine, Config::default()).unwrap();
    let query = random_vectors(&mut rng, 1, 768).remove(0);

    c.bench_function("search_top_10_of_10000", |b| {
        b.iter(|| index.search(black_box(&query), 10).unwrap());
    });
}

criterion_group!(benches, benchmark_build, benchmark_search);
criterion_main!(benches);
