//! Criterion benchmarks for the series primitives.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ma_math::{exponential_smoothing, linear_regression, moving_average, raw_autocorrelations};

fn synthetic(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 0.5 * i as f64 + 20.0 * (i as f64 / 24.0 * std::f64::consts::TAU).sin())
        .collect()
}

fn bench_series_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_ops");
    for n in [24usize, 168, 720] {
        let data = synthetic(n);
        group.bench_with_input(BenchmarkId::new("linear_regression", n), &data, |b, d| {
            b.iter(|| black_box(linear_regression(black_box(d))))
        });
        group.bench_with_input(BenchmarkId::new("moving_average", n), &data, |b, d| {
            b.iter(|| black_box(moving_average(black_box(d), 3)))
        });
        group.bench_with_input(BenchmarkId::new("exponential_smoothing", n), &data, |b, d| {
            b.iter(|| black_box(exponential_smoothing(black_box(d), 0.3)))
        });
        group.bench_with_input(BenchmarkId::new("raw_autocorrelations", n), &data, |b, d| {
            b.iter(|| black_box(raw_autocorrelations(black_box(d), 24)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_series_ops);
criterion_main!(benches);
