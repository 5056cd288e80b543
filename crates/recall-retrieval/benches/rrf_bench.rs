//! Criterion benchmarks for RRF fusion.
//!
//! Targets:
//! - 2 origins × 100 candidates < 0.1ms
//! - 4 origins × 1000 candidates < 2ms

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recall_retrieval::search::{fuse, WeightedRanking};

/// Origins share about half their ids so fusion has overlaps to merge.
fn rankings(origins: usize, per_origin: usize) -> Vec<WeightedRanking> {
    (0..origins)
        .map(|o| {
            let hits = (0..per_origin)
                .map(|i| {
                    let id = if i % 2 == 0 { i } else { o * per_origin + i };
                    (format!("doc{id}"), 1.0 - i as f64 / per_origin as f64)
                })
                .collect();
            WeightedRanking::from_ordered(&format!("origin{o}"), 1.0 / (o + 1) as f64, hits)
        })
        .collect()
}

fn bench_fuse(c: &mut Criterion) {
    let small = rankings(2, 100);
    c.bench_function("fuse_2x100", |b| b.iter(|| fuse(black_box(&small), 60)));

    let large = rankings(4, 1000);
    c.bench_function("fuse_4x1000", |b| b.iter(|| fuse(black_box(&large), 60)));
}

criterion_group!(benches, bench_fuse);
criterion_main!(benches);
