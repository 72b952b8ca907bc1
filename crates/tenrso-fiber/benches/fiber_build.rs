//! Benchmarks for fiber tensor construction
//!
//! Compares the sequential, parallel and in-place construction paths and
//! measures mode-order planning, sorting and the CSR view in isolation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use tenrso_fiber::{
    plan_mode_orders, sorted_permutation, CoordTensor, FiberConfig, FiberTensor,
};

/// Generate a random three-mode tensor with `nnz` nonzeros
fn random_tensor(dims: [usize; 3], nnz: usize) -> CoordTensor<f64> {
    let mut tt = CoordTensor::zeros(dims.to_vec()).expect("Failed to create tensor");

    // Simple pseudo-random generation for reproducibility
    let mut seed = 12345u64;
    let mut next = |bound: usize| {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        ((seed >> 16) % bound as u64) as usize
    };

    for _ in 0..nnz {
        let coords = [next(dims[0]), next(dims[1]), next(dims[2])];
        let val = next(10000) as f64 / 10000.0;
        tt.push(&coords, val).expect("Failed to push nonzero");
    }
    tt
}

const SHAPES: [([usize; 3], usize); 3] = [
    ([50, 50, 50], 10_000),
    ([200, 1000, 20], 50_000),
    ([500, 500, 500], 200_000),
];

/// Benchmark full construction, sequential vs parallel
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("fiber_build");

    for (dims, nnz) in SHAPES.iter() {
        let tt = random_tensor(*dims, *nnz);
        let label = format!("{}x{}x{}_nnz{}", dims[0], dims[1], dims[2], nnz);
        group.throughput(Throughput::Elements(*nnz as u64));

        let sequential = FiberConfig::default()
            .parallel(false)
            .check_sorted(false)
            .validate_structure(false);
        group.bench_with_input(BenchmarkId::new("sequential", &label), &tt, |b, tt| {
            b.iter(|| {
                let ft = FiberTensor::with_config(black_box(tt), &sequential).expect("build failed");
                black_box(ft);
            });
        });

        let parallel = sequential.clone().parallel(true).min_nnz_for_parallel(0);
        group.bench_with_input(BenchmarkId::new("parallel", &label), &tt, |b, tt| {
            b.iter(|| {
                let ft = FiberTensor::with_config(black_box(tt), &parallel).expect("build failed");
                black_box(ft);
            });
        });

        group.bench_with_input(BenchmarkId::new("in_place", &label), &tt, |b, tt| {
            b.iter_batched(
                || tt.clone(),
                |mut owned| {
                    let ft = FiberTensor::from_coord_in_place(&mut owned, &sequential)
                        .expect("build failed");
                    black_box(ft);
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// Benchmark the sort that dominates construction
fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted_permutation");

    for (dims, nnz) in SHAPES.iter() {
        let tt = random_tensor(*dims, *nnz);
        let order = plan_mode_orders(tt.dims()).swap_remove(0);
        group.throughput(Throughput::Elements(*nnz as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}x{}_nnz{}", dims[0], dims[1], dims[2], nnz)),
            &tt,
            |b, tt| {
                b.iter(|| {
                    let perm = sorted_permutation(black_box(tt), &order).expect("sort failed");
                    black_box(perm);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the CSR view of one mode
fn bench_to_csr(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_csr");

    for (dims, nnz) in SHAPES.iter() {
        let tt = random_tensor(*dims, *nnz);
        let ft = FiberTensor::from_coord(&tt).expect("build failed");
        group.throughput(Throughput::Elements(*nnz as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}x{}_nnz{}", dims[0], dims[1], dims[2], nnz)),
            &ft,
            |b, ft| {
                b.iter(|| {
                    let csr = ft.to_csr(black_box(0)).expect("to_csr failed");
                    black_box(csr);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_sort, bench_to_csr);
criterion_main!(benches);
