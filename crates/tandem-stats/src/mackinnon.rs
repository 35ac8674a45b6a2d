//! MacKinnon response surfaces for unit-root and cointegration tests.
//!
//! Approximate p-values follow MacKinnon (1994), "Approximate asymptotic
//! distribution functions for unit-root and cointegration tests"; finite
//! sample critical values follow MacKinnon (2010), "Critical values for
//! cointegration tests".

use crate::adf::Deterministic;
use crate::error::{Result, StatsError};
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

struct PValueSurface {
    /// Below this statistic the p-value is reported as 0
    min: f64,
    /// Above this statistic the p-value is reported as 1
    max: f64,
    /// Switch point between the small-p and large-p polynomials
    star: f64,
    small_p: [f64; 3],
    large_p: [f64; 4],
}

const SMALL_P_SCALE: [f64; 3] = [1.0, 1.0, 1e-2];
const LARGE_P_SCALE: [f64; 4] = [1.0, 1e-1, 1e-1, 1e-2];

fn pvalue_surface(deterministic: Deterministic, n_vars: usize) -> Option<PValueSurface> {
    let surface = match (deterministic, n_vars) {
        (Deterministic::None, 1) => PValueSurface {
            min: -19.04,
            max: f64::INFINITY,
            star: -1.04,
            small_p: [0.6344, 1.2378, 3.2496],
            large_p: [0.4797, 9.3557, -0.6999, 3.3066],
        },
        (Deterministic::None, 2) => PValueSurface {
            min: -19.62,
            max: 1.51,
            star: -1.53,
            small_p: [1.9129, 1.3857, 3.5322],
            large_p: [1.5578, 8.558, -2.083, -3.3549],
        },
        (Deterministic::Constant, 1) => PValueSurface {
            min: -18.83,
            max: 2.74,
            star: -1.61,
            small_p: [2.1659, 1.4412, 3.8269],
            large_p: [1.7339, 9.3202, -1.2745, -1.0368],
        },
        (Deterministic::Constant, 2) => PValueSurface {
            min: -18.86,
            max: 0.92,
            star: -2.62,
            small_p: [2.92, 1.5012, 3.9796],
            large_p: [2.1945, 6.4695, -2.9198, -4.2377],
        },
        (Deterministic::ConstantTrend, 1) => PValueSurface {
            min: -16.18,
            max: 0.7,
            star: -2.89,
            small_p: [3.2512, 1.6047, 4.9588],
            large_p: [2.5261, 6.1654, -3.7956, -6.0285],
        },
        _ => return None,
    };
    Some(surface)
}

fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

fn polyval(coefficients: impl Iterator<Item = f64>, x: f64) -> f64 {
    coefficients
        .enumerate()
        .map(|(power, c)| c * x.powi(power as i32))
        .sum()
}

/// Approximate p-value of a (augmented) Dickey-Fuller or Engle-Granger
/// statistic.
///
/// `n_vars` is the number of variables in the system: 1 for a unit-root
/// test on a single series, 2 for a two-series cointegration test. A
/// statistic of `-inf` yields 0.
///
/// # Errors
/// Returns [`StatsError::UnsupportedTable`] when no surface is tabulated.
pub fn mackinnon_pvalue(statistic: f64, deterministic: Deterministic, n_vars: usize) -> Result<f64> {
    let surface = pvalue_surface(deterministic, n_vars).ok_or(StatsError::UnsupportedTable {
        deterministic,
        n_vars,
    })?;

    if statistic > surface.max {
        return Ok(1.0);
    }
    if statistic < surface.min {
        return Ok(0.0);
    }

    let z = if statistic <= surface.star {
        polyval(
            surface.small_p.iter().zip(SMALL_P_SCALE).map(|(c, s)| c * s),
            statistic,
        )
    } else {
        polyval(
            surface.large_p.iter().zip(LARGE_P_SCALE).map(|(c, s)| c * s),
            statistic,
        )
    };
    Ok(standard_normal_cdf(z))
}

/// Critical values at the 1%, 5% and 10% levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    /// 1% critical value
    pub one_percent: f64,
    /// 5% critical value
    pub five_percent: f64,
    /// 10% critical value
    pub ten_percent: f64,
}

fn critical_surface(deterministic: Deterministic, n_vars: usize) -> Option<[[f64; 4]; 3]> {
    let table = match (deterministic, n_vars) {
        (Deterministic::None, 1) => [
            [-2.56574, -2.2358, -3.627, 0.0],
            [-1.94100, -0.2686, -3.365, 31.223],
            [-1.61682, 0.2656, -2.714, 25.364],
        ],
        (Deterministic::Constant, 1) => [
            [-3.43035, -6.5393, -16.786, -79.433],
            [-2.86154, -2.8903, -4.234, -40.040],
            [-2.56677, -1.5384, -2.809, 0.0],
        ],
        (Deterministic::Constant, 2) => [
            [-3.89644, -10.9519, -22.527, 0.0],
            [-3.33613, -6.1101, -6.823, 0.0],
            [-3.04445, -4.2412, -2.720, 0.0],
        ],
        (Deterministic::ConstantTrend, 1) => [
            [-3.95877, -9.0531, -28.428, -134.155],
            [-3.41049, -4.3904, -9.036, -45.374],
            [-3.12705, -2.5856, -3.925, -22.380],
        ],
        _ => return None,
    };
    Some(table)
}

/// Critical values for sample size `nobs`, or the asymptotic values when
/// `nobs` is `None`.
///
/// # Errors
/// Returns [`StatsError::UnsupportedTable`] when no surface is tabulated.
pub fn mackinnon_critical_values(
    deterministic: Deterministic,
    n_vars: usize,
    nobs: Option<usize>,
) -> Result<CriticalValues> {
    let table = critical_surface(deterministic, n_vars).ok_or(StatsError::UnsupportedTable {
        deterministic,
        n_vars,
    })?;

    let at = |row: [f64; 4]| match nobs {
        Some(t) if t > 0 => polyval(row.into_iter(), 1.0 / t as f64),
        _ => row[0],
    };

    Ok(CriticalValues {
        one_percent: at(table[0]),
        five_percent: at(table[1]),
        ten_percent: at(table[2]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[test]
    fn test_pvalue_at_five_percent_critical_value() {
        let p = mackinnon_pvalue(-3.34, Deterministic::Constant, 2).unwrap();
        assert_abs_diff_eq!(p, 0.05, epsilon = 0.005);
    }

    #[test]
    fn test_adf_pvalue_at_five_percent_critical_value() {
        let p = mackinnon_pvalue(-2.86, Deterministic::Constant, 1).unwrap();
        assert_abs_diff_eq!(p, 0.05, epsilon = 0.005);
    }

    #[rstest]
    #[case(Deterministic::None, 1)]
    #[case(Deterministic::None, 2)]
    #[case(Deterministic::Constant, 1)]
    #[case(Deterministic::Constant, 2)]
    #[case(Deterministic::ConstantTrend, 1)]
    fn test_pvalue_monotone(#[case] deterministic: Deterministic, #[case] n_vars: usize) {
        let mut previous = 0.0;
        let mut stat = -20.0;
        while stat < 3.0 {
            let p = mackinnon_pvalue(stat, deterministic, n_vars).unwrap();
            assert!((0.0..=1.0).contains(&p));
            assert!(p + 1e-3 >= previous, "p-value fell at {stat}: {previous} -> {p}");
            previous = p;
            stat += 0.05;
        }
    }

    #[test]
    fn test_pvalue_bounds() {
        assert_eq!(mackinnon_pvalue(f64::NEG_INFINITY, Deterministic::Constant, 2).unwrap(), 0.0);
        assert_eq!(mackinnon_pvalue(5.0, Deterministic::Constant, 2).unwrap(), 1.0);
    }

    #[test]
    fn test_unsupported_table() {
        assert!(matches!(
            mackinnon_pvalue(-3.0, Deterministic::ConstantTrend, 2),
            Err(StatsError::UnsupportedTable { n_vars: 2, .. })
        ));
        assert!(mackinnon_critical_values(Deterministic::None, 2, Some(100)).is_err());
    }

    #[test]
    fn test_critical_values() {
        let asymptotic = mackinnon_critical_values(Deterministic::Constant, 2, None).unwrap();
        assert_abs_diff_eq!(asymptotic.five_percent, -3.33613, epsilon = 1e-12);

        let finite = mackinnon_critical_values(Deterministic::Constant, 2, Some(499)).unwrap();
        let t = 1.0 / 499.0;
        assert_abs_diff_eq!(
            finite.one_percent,
            -3.89644 - 10.9519 * t - 22.527 * t * t,
            epsilon = 1e-12
        );
        assert!(finite.one_percent < finite.five_percent);
        assert!(finite.five_percent < finite.ten_percent);
    }
}
