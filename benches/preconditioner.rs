use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use newtonic::{Identity, IncompleteCholesky, Jacobi, Preconditioner};

/// tridiag(-1, 2.1, -1)
fn tridiagonal(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| match i.abs_diff(j) {
                    0 => 2.1,
                    1 => -1.0,
                    _ => 0.0,
                })
                .collect()
        })
        .collect()
}

/// Dense SPD matrix with entries `1 / (1 + |i - j|)` and a boosted diagonal.
fn dense_spd(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    let base = 1.0 / (1.0 + i.abs_diff(j) as f64);
                    if i == j {
                        base + n as f64
                    } else {
                        base
                    }
                })
                .collect()
        })
        .collect()
}

fn bench_factorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("factorize");
    let ic = IncompleteCholesky::<f64>::default();
    for n in [10, 50, 100] {
        let tri = tridiagonal(n);
        let dense = dense_spd(n);

        group.bench_with_input(BenchmarkId::new("jacobi", n), &dense, |b, a| {
            b.iter(|| black_box(Jacobi.factorize(black_box(a))))
        });
        group.bench_with_input(BenchmarkId::new("ic0_tridiagonal", n), &tri, |b, a| {
            b.iter(|| black_box(ic.factorize(black_box(a))))
        });
        group.bench_with_input(BenchmarkId::new("ic0_dense", n), &dense, |b, a| {
            b.iter(|| black_box(ic.factorize(black_box(a))))
        });
    }
    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    let ic = IncompleteCholesky::<f64>::default();
    for n in [10, 50, 100] {
        let dense = dense_spd(n);
        let r: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
        let jacobi = Jacobi.factorize(&dense);
        let lower = ic.factorize(&dense);

        group.bench_with_input(BenchmarkId::new("identity", n), &r, |b, r| {
            b.iter(|| black_box(Identity.solve(&(), black_box(r))))
        });
        group.bench_with_input(BenchmarkId::new("jacobi", n), &r, |b, r| {
            b.iter(|| black_box(Jacobi.solve(&jacobi, black_box(r))))
        });
        group.bench_with_input(BenchmarkId::new("ic0", n), &r, |b, r| {
            b.iter(|| black_box(ic.solve(&lower, black_box(r))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_factorize, bench_solve);
criterion_main!(benches);
