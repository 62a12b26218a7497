//! Benchmarks for the worker engine
//!
//! Run with: cargo bench --package engine
//!
//! Uses a synthetic partition so the benchmark needs no dataset on disk.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::Partition;
use engine::{scaling, similarity, WorkerEngine};

fn synthetic_partition(reviewers: usize, items_per_reviewer: usize, catalog: usize) -> Partition {
    (0..reviewers)
        .map(|u| {
            let row = (0..items_per_reviewer)
                .map(|k| {
                    let product = (u * 7 + k * 13) % catalog;
                    (format!("p{product}"), ((u + k) % 5 + 1) as f64)
                })
                .collect();
            (format!("u{u}"), row)
        })
        .collect()
}

fn bench_co_occurrence(c: &mut Criterion) {
    let partition = synthetic_partition(2_000, 12, 500);

    c.bench_function("co_occurrence", |b| {
        b.iter(|| black_box(similarity::co_occurrence(black_box(&partition))))
    });
}

fn bench_min_max_scale(c: &mut Criterion) {
    let partition = synthetic_partition(2_000, 12, 500);
    let similarities = similarity::co_occurrence(&partition);

    c.bench_function("min_max_scale", |b| {
        b.iter(|| black_box(scaling::min_max_scale_or(black_box(&similarities), 1.0)))
    });
}

fn bench_full_run(c: &mut Criterion) {
    let partition = synthetic_partition(2_000, 12, 500);
    let engine = WorkerEngine::new();

    c.bench_function("worker_engine_run", |b| {
        b.iter(|| black_box(engine.run(black_box(&partition))))
    });
}

criterion_group!(benches, bench_co_occurrence, bench_min_max_scale, bench_full_run);
criterion_main!(benches);
