//! Benchmarks for collocation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quasigeoid_algorithms::collocation::{
    collocate, empirical_covariance, CollocationParams, CovFunction, CovType, EmpiricalCovParams,
    RegressionTrend, TrendModel,
};
use quasigeoid_core::{GeodeticPoint, Grid, GridSpec, Observation, RefSystem};

/// Control points on a jittered lattice with a varied signal
fn create_controls(side: usize) -> (Vec<GeodeticPoint>, Vec<Observation>) {
    let mut points = Vec::with_capacity(side * side);
    let mut signals = Vec::with_capacity(side * side);
    for i in 0..side {
        for j in 0..side {
            let lat = 51.0 + 4.0 * i as f64 / side as f64 + ((i * 7 + j * 13) % 10) as f64 * 0.005;
            let lon = 24.0 + 6.0 * j as f64 / side as f64 + ((i * 11 + j * 3) % 10) as f64 * 0.005;
            points.push(GeodeticPoint::new(lat, lon));
            let value = 0.2 * (lat * 2.0).sin() + 0.1 * (lon * 3.0).cos();
            signals.push(Observation::new(value, 0.01));
        }
    }
    (points, signals)
}

fn create_targets(step_minutes: f64) -> Vec<GeodeticPoint> {
    let step = step_minutes / 60.0;
    let spec = GridSpec::new(51.0, 24.0, 55.0, 30.0, step, step).unwrap();
    Grid::new(spec)
        .unwrap()
        .nodes()
        .iter()
        .map(GeodeticPoint::of)
        .collect()
}

fn bench_empirical(c: &mut Criterion) {
    let mut group = c.benchmark_group("empirical_covariance");
    let ellipsoid = RefSystem::Grs80.ellipsoid();

    for side in [10, 20, 30].iter() {
        let (points, signals) = create_controls(*side);
        let values: Vec<f64> = signals.iter().map(|s| s.value()).collect();

        group.bench_with_input(BenchmarkId::from_parameter(side * side), side, |b, _| {
            b.iter(|| {
                empirical_covariance(
                    black_box(&points),
                    black_box(&values),
                    CovType::Hirvonen,
                    &ellipsoid,
                    &EmpiricalCovParams::default(),
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_collocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("collocate");
    group.sample_size(20);
    let ellipsoid = RefSystem::Grs80.ellipsoid();
    let cov = CovFunction::new(CovType::Hirvonen, 0.02, 0.5).unwrap();
    let (points, signals) = create_controls(15);
    let trend = TrendModel::Regression(RegressionTrend::new(1, 1, 1).unwrap());

    for step in [10.0, 5.0, 2.5].iter() {
        let targets = create_targets(*step);

        group.bench_with_input(BenchmarkId::new("plain", targets.len()), step, |b, _| {
            b.iter(|| {
                collocate(
                    black_box(&points),
                    black_box(&signals),
                    black_box(&targets),
                    &cov,
                    &ellipsoid,
                    &CollocationParams::default(),
                )
                .unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("trend", targets.len()), step, |b, _| {
            b.iter(|| {
                collocate(
                    black_box(&points),
                    black_box(&signals),
                    black_box(&targets),
                    &cov,
                    &ellipsoid,
                    &CollocationParams { trend: Some(trend) },
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_empirical, bench_collocate);
criterion_main!(benches);
