//! Benchmark for PersistentList vs standard Vec.
//!
//! Compares indexed reads, persistent appends, transient batch builds,
//! and iteration against Rust's standard Vec.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use permafrost::{PersistentList, TransientList};
use std::hint::black_box;

// =============================================================================
// push_back Benchmark
// =============================================================================

fn benchmark_push_back(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("push_back");

    for size in [100, 1_000, 10_000] {
        // PersistentList push_back (one version per element)
        group.bench_with_input(
            BenchmarkId::new("PersistentList", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut list = PersistentList::new();
                    for index in 0..size {
                        list = list.push_back(black_box(index));
                    }
                    black_box(list)
                });
            },
        );

        // TransientList push_back (in-place staging)
        group.bench_with_input(
            BenchmarkId::new("TransientList", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut builder = TransientList::new();
                    for index in 0..size {
                        builder.push_back(black_box(index));
                    }
                    black_box(builder.into_persistent())
                });
            },
        );

        // Vec push
        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut vector = Vec::new();
                for index in 0..size {
                    vector.push(black_box(index));
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

// =============================================================================
// get Benchmark (indexed reads)
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in [100, 1_000, 10_000] {
        // Prepare data
        let persistent_list: PersistentList<i32> = (0..size).collect();
        let standard_vector: Vec<i32> = (0..size).collect();

        // PersistentList get (O(log N))
        group.bench_with_input(
            BenchmarkId::new("PersistentList", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0;
                    for index in 0..size as usize {
                        if let Some(&value) = persistent_list.get(black_box(index)) {
                            sum += value;
                        }
                    }
                    black_box(sum)
                });
            },
        );

        // Vec indexing (O(1))
        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0;
                for index in 0..size as usize {
                    sum += standard_vector[black_box(index)];
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// update Benchmark (point replacement)
// =============================================================================

fn benchmark_update(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("update");

    for size in [1_000, 10_000] {
        let persistent_list: PersistentList<i32> = (0..size).collect();
        let middle = (size / 2) as usize;

        // PersistentList update (path copy, original kept alive)
        group.bench_with_input(
            BenchmarkId::new("PersistentList", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let updated = persistent_list.update(black_box(middle), 0);
                    black_box(updated)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// iteration Benchmark
// =============================================================================

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iteration");

    for size in [100, 1_000, 10_000] {
        let persistent_list: PersistentList<i32> = (0..size).collect();
        let standard_vector: Vec<i32> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentList", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let sum: i32 = persistent_list.iter().sum();
                    black_box(sum)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, _| {
            bencher.iter(|| {
                let sum: i32 = standard_vector.iter().sum();
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// from_slice Benchmark (balanced bulk construction)
// =============================================================================

fn benchmark_from_slice(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("from_slice");

    for size in [100, 1_000, 10_000] {
        let source: Vec<i32> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentList", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let list = PersistentList::from_slice(black_box(&source));
                    black_box(list)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_push_back,
    benchmark_get,
    benchmark_update,
    benchmark_iteration,
    benchmark_from_slice
);

criterion_main!(benches);
