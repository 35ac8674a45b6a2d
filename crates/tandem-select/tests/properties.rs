//! Properties of the distance matrix and the pair generator.

use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use proptest::prelude::*;
use std::collections::HashSet;
use tandem_cluster::NOISE;
use tandem_data::{MarketFactorSeries, ReturnPanel};
use tandem_select::{ClusterAssignment, DistanceEngine, compute_distance, generate_pairs};
use tandem_stats::pearson;

fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
    (0..n).map(|i| start + chrono::Duration::days(i as i64)).collect()
}

/// Returns panel with 2 to 7 instruments and 5 to 39 observations, plus a
/// market series of the same length.
fn universe() -> impl Strategy<Value = (ReturnPanel, MarketFactorSeries)> {
    (2usize..8, 5usize..40).prop_flat_map(|(n, t)| {
        (
            prop::collection::vec(-5.0f64..5.0, n * t),
            prop::collection::vec(-3.0f64..3.0, t),
        )
            .prop_map(move |(cells, market)| {
                let names = (0..n).map(|j| format!("I{j}")).collect();
                let values = Array2::from_shape_vec((t, n), cells).unwrap();
                (
                    ReturnPanel::new(dates(t), names, values).unwrap(),
                    MarketFactorSeries::new("MKT", dates(t), Array1::from_vec(market)).unwrap(),
                )
            })
    })
}

proptest! {
    #[test]
    fn distance_matrix_is_a_bounded_symmetric_dissimilarity((returns, market) in universe()) {
        let d = compute_distance(&returns, &market).unwrap();
        let n = returns.n_instruments();
        prop_assert_eq!(d.len(), n);
        for i in 0..n {
            prop_assert_eq!(d.get(i, i), 0.0);
            for j in 0..n {
                prop_assert_eq!(d.get(i, j), d.get(j, i));
                prop_assert!((0.0..=1.0).contains(&d.get(i, j)));
            }
        }
    }

    #[test]
    fn parallel_and_sequential_engines_agree((returns, market) in universe()) {
        let parallel = DistanceEngine::new(true).compute(&returns, &market).unwrap();
        let sequential = DistanceEngine::new(false).compute(&returns, &market).unwrap();
        prop_assert_eq!(parallel, sequential);
    }

    #[test]
    fn constant_market_gives_plain_correlation_distance(
        (returns, _) in universe(),
        level in -1.0f64..1.0,
    ) {
        let t = returns.n_observations();
        let flat = MarketFactorSeries::new("MKT", dates(t), Array1::from_elem(t, level)).unwrap();
        let d = compute_distance(&returns, &flat).unwrap();
        for i in 0..returns.n_instruments() {
            for j in (i + 1)..returns.n_instruments() {
                let r = pearson(returns.column(i), returns.column(j)).unwrap();
                prop_assert_eq!(d.get(i, j), 1.0 - r.abs());
            }
        }
    }

    #[test]
    fn clusters_yield_all_and_only_within_cluster_pairs(
        labels in prop::collection::vec(-1i64..4, 0..25),
    ) {
        let names: Vec<String> = (0..labels.len()).map(|i| format!("I{i}")).collect();
        let assignment = ClusterAssignment::new(names, labels.clone()).unwrap();
        let pairs = generate_pairs(&assignment);

        let expected: usize = (0..4)
            .map(|label| labels.iter().filter(|&&l| l == label).count())
            .map(|k| k * k.saturating_sub(1) / 2)
            .sum();
        prop_assert_eq!(pairs.len(), expected);

        let mut seen = HashSet::new();
        for pair in &pairs {
            prop_assert_ne!(pair.cluster, NOISE);
            prop_assert_ne!(&pair.first, &pair.second);
            prop_assert_eq!(assignment.label(&pair.first), Some(pair.cluster));
            prop_assert_eq!(assignment.label(&pair.second), Some(pair.cluster));
            prop_assert!(seen.insert((pair.first.clone(), pair.second.clone())));
        }
    }
}
