//! Benchmarks for lattice invariant computations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use integral_lattice::{
    smith::invariant_factors,
    utils::matrix_utils::{generate_nondegenerate_gram, root_lattice_a},
    DiscriminantGroup, Lattice, LatticeParams, Matrix,
};

fn scaled_identity(n: usize) -> Matrix {
    Matrix::diagonal(&vec![2; n]).unwrap()
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Construction");

    for size in [2, 3, 4].iter() {
        group.bench_with_input(
            BenchmarkId::new("2I_n", size),
            size,
            |b, &size| {
                let gram = scaled_identity(size);
                b.iter(|| black_box(Lattice::new(black_box(gram.clone())).unwrap()));
            },
        );
    }

    for size in [2, 3, 4, 5].iter() {
        group.bench_with_input(
            BenchmarkId::new("A_n", size),
            size,
            |b, &size| {
                let gram = root_lattice_a(size).unwrap();
                b.iter(|| black_box(Lattice::new(black_box(gram.clone())).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("Discriminant Group Enumeration");
    let params = LatticeParams::default();

    for seed in [1u64, 2, 3].iter() {
        group.bench_with_input(
            BenchmarkId::new("random rank 3", seed),
            seed,
            |b, &seed| {
                let gram = generate_nondegenerate_gram(3, 6, 60, 10_000, Some(seed)).unwrap();
                b.iter(|| black_box(DiscriminantGroup::enumerate(black_box(&gram), &params).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_determinant(c: &mut Criterion) {
    let mut group = c.benchmark_group("Determinant");

    for size in [4, 6, 8, 10].iter() {
        group.bench_with_input(
            BenchmarkId::new("A_n", size),
            size,
            |b, &size| {
                let gram = root_lattice_a(size).unwrap();
                b.iter(|| black_box(gram.determinant().unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_definiteness(c: &mut Criterion) {
    let mut group = c.benchmark_group("Definiteness");

    for size in [3, 5, 8].iter() {
        let lattice = Lattice::new(root_lattice_a(*size).unwrap()).unwrap();
        group.bench_with_input(
            BenchmarkId::new("is_greater_than", size),
            &lattice,
            |b, lattice| b.iter(|| black_box(lattice.is_greater_than(black_box(0)).unwrap())),
        );
        group.bench_with_input(
            BenchmarkId::new("is_at_least", size),
            &lattice,
            |b, lattice| b.iter(|| black_box(lattice.is_at_least(black_box(0)).unwrap())),
        );
    }

    group.finish();
}

fn bench_root_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Root Search");

    // diag(4, ..., 4) has no root, so the whole grid is scanned
    for size in [2, 3].iter() {
        let lattice = Lattice::new(Matrix::diagonal(&vec![4; *size]).unwrap()).unwrap();
        group.bench_with_input(
            BenchmarkId::new("full grid", size),
            &lattice,
            |b, lattice| b.iter(|| black_box(lattice.has_root().unwrap())),
        );
    }

    group.finish();
}

fn bench_smith(c: &mut Criterion) {
    let mut group = c.benchmark_group("Smith Normal Form");

    for size in [4, 8, 12].iter() {
        group.bench_with_input(
            BenchmarkId::new("A_n", size),
            size,
            |b, &size| {
                let gram = root_lattice_a(size).unwrap();
                b.iter(|| black_box(invariant_factors(black_box(&gram)).unwrap()));
            },
        );
    }

    group.finish();
}

fn benchmark_configuration() -> Criterion {
    Criterion::default()
        .sample_size(10)
        .warm_up_time(std::time::Duration::from_millis(100))
        .measurement_time(std::time::Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = benchmark_configuration();
    targets =
        bench_construction,
        bench_enumeration,
        bench_determinant,
        bench_definiteness,
        bench_root_search,
        bench_smith
}

criterion_main!(benches);
