//! Performance benchmarks for latent factor decompositions
//!
//! Benchmarks a fixed number of iterations of each variant on random sparse
//! networks, plus the Gram-Schmidt pass on its own.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use latrec_latent::{
    ConvergenceConfig, Decomposition, EigenDecomposition, LaplacianDecomposition,
    LatentFactorModel, MaskDecomposition, Network, WeightedMean,
};
use latrec_sparse::{MatrixFactory, ValueDomain};
use scirs2_core::random::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

const ITERATIONS: usize = 10;

/// Users × items relation with about `degree` ratings per user
fn rating_network(users: usize, items: usize, degree: usize, seed: u64) -> Network {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ratings = MatrixFactory::new_matrix(users, items, ValueDomain::Byte);
    for u in 0..users {
        for _ in 0..degree {
            let item = rng.random_range(0..items);
            let rating: i32 = rng.random_range(1..=5);
            ratings.set(u, item, f64::from(rating));
        }
    }

    let mut network = Network::new();
    let user_type = network.add_entity_type("user", users);
    let item_type = network.add_entity_type("item", items);
    network
        .add_relation(user_type, item_type, ratings, 1.0)
        .expect("shape matches the declared types");
    network
}

/// Fixed-length runs, so every sample does the same work
fn fixed(iterations: usize) -> ConvergenceConfig {
    ConvergenceConfig::default()
        .with_tolerance(f64::MIN_POSITIVE)
        .with_max_iterations(iterations)
}

// ============================================================================
// Orthogonalization
// ============================================================================

fn bench_orthogonalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("orthogonalize");

    for &(entities, rank) in &[(1_000, 8), (1_000, 32), (10_000, 8)] {
        let mut rng = StdRng::seed_from_u64(42);
        let model = LatentFactorModel::random(&[entities / 2, entities / 2], rank, true, &mut rng)
            .expect("valid rank");

        group.throughput(Throughput::Elements((entities * rank) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("n{}_r{}", entities, rank)),
            &model,
            |b, model| {
                b.iter(|| {
                    let mut m = model.clone();
                    black_box(m.orthogonalize())
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Decomposition Benchmarks
// ============================================================================

fn bench_eigen(c: &mut Criterion) {
    let mut group = c.benchmark_group("eigen");
    group.sample_size(10);

    for &(users, items, rank) in &[(500, 1_000, 8), (2_000, 5_000, 16)] {
        let network = rating_network(users, items, 20, 7);

        group.bench_function(
            BenchmarkId::from_parameter(format!("{}x{}_r{}", users, items, rank)),
            |b| {
                b.iter(|| {
                    let mut rng = StdRng::seed_from_u64(1);
                    let mut eigen =
                        EigenDecomposition::new(&network, rank, fixed(ITERATIONS), &mut rng)
                            .expect("valid rank");
                    black_box(eigen.update())
                })
            },
        );
    }

    group.finish();
}

fn bench_laplacian(c: &mut Criterion) {
    let mut group = c.benchmark_group("laplacian");
    group.sample_size(10);

    let network = rating_network(500, 1_000, 20, 7);
    group.bench_function("500x1000_r8", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            let mut laplacian = LaplacianDecomposition::new(
                &network,
                8,
                WeightedMean::default(),
                fixed(ITERATIONS),
                &mut rng,
            )
            .expect("valid rank");
            black_box(laplacian.update())
        })
    });

    group.finish();
}

fn bench_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask");
    group.sample_size(10);

    let network = rating_network(500, 1_000, 20, 7);
    group.bench_function("500x1000_r4", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            let mut mask = MaskDecomposition::new(&network, 0, 4, fixed(ITERATIONS), &mut rng)
                .expect("valid rank");
            black_box(mask.update())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_orthogonalize,
    bench_eigen,
    bench_laplacian,
    bench_mask
);
criterion_main!(benches);
