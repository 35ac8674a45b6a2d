//! Distance engine throughput for a 200-instrument universe.

#![allow(missing_docs)]

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tandem_cluster::Optics;
use tandem_data::{MarketFactorSeries, ReturnPanel};
use tandem_select::{DistanceEngine, SelectionConfig, cluster_with};

const INSTRUMENTS: usize = 200;
const OBSERVATIONS: usize = 500;

fn universe() -> (ReturnPanel, MarketFactorSeries) {
    let mut rng = StdRng::seed_from_u64(2024);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let dates: Vec<_> = (0..OBSERVATIONS)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect();

    let market = Array1::from_shape_fn(OBSERVATIONS, |_| normal.sample(&mut rng));
    let values = Array2::from_shape_fn((OBSERVATIONS, INSTRUMENTS), |(t, _)| {
        0.8 * market[t] + normal.sample(&mut rng)
    });
    let names = (0..INSTRUMENTS).map(|j| format!("S{j:03}")).collect();

    (
        ReturnPanel::new(dates.clone(), names, values).unwrap(),
        MarketFactorSeries::new("MKT", dates, market).unwrap(),
    )
}

fn bench_distance(c: &mut Criterion) {
    let (returns, market) = universe();
    let mut group = c.benchmark_group("distance_200");
    for parallel in [false, true] {
        let engine = DistanceEngine::new(parallel);
        let label = if parallel { "rayon" } else { "sequential" };
        group.bench_with_input(BenchmarkId::from_parameter(label), &engine, |b, engine| {
            b.iter(|| engine.compute(black_box(&returns), black_box(&market)).unwrap())
        });
    }
    group.finish();
}

fn bench_optics(c: &mut Criterion) {
    let (returns, market) = universe();
    let distances = DistanceEngine::default().compute(&returns, &market).unwrap();
    let optics = Optics::new(SelectionConfig::default().optics_config());
    c.bench_function("optics_200", |b| {
        b.iter(|| cluster_with(&optics, black_box(&distances)).unwrap())
    });
}

criterion_group!(benches, bench_distance, bench_optics);
criterion_main!(benches);
