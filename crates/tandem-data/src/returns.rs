//! Returns derived from price levels.

use crate::error::{DataError, Result};
use crate::panel::{MarketFactorSeries, PriceLevelPanel, ReturnPanel};
use ndarray::{Array1, Array2, ArrayView1, Zip, s};
use serde::{Deserialize, Serialize};

/// How period returns are computed from consecutive levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnKind {
    /// `(p_t / p_{t-1} - 1) * 100`
    #[default]
    Percent,
    /// `p_t / p_{t-1} - 1`
    Simple,
    /// `ln(p_t / p_{t-1})`
    Log,
}

impl ReturnKind {
    /// Return between two consecutive levels.
    pub fn compute(self, previous: f64, current: f64) -> f64 {
        let ratio = current / previous;
        match self {
            Self::Percent => (ratio - 1.0) * 100.0,
            Self::Simple => ratio - 1.0,
            Self::Log => ratio.ln(),
        }
    }
}

impl std::str::FromStr for ReturnKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "percent" | "pct" => Ok(Self::Percent),
            "simple" => Ok(Self::Simple),
            "log" => Ok(Self::Log),
            other => Err(format!("unknown return kind '{other}' (expected percent, simple or log)")),
        }
    }
}

fn series_returns(levels: ArrayView1<'_, f64>, kind: ReturnKind) -> Array1<f64> {
    let n = levels.len();
    if n < 2 {
        return Array1::zeros(0);
    }
    let mut out = Array1::zeros(n - 1);
    Zip::from(&mut out)
        .and(levels.slice(s![..n - 1]))
        .and(levels.slice(s![1..]))
        .for_each(|r, &prev, &curr| *r = kind.compute(prev, curr));
    out
}

impl PriceLevelPanel {
    /// Period returns of every instrument, dropping the first date.
    ///
    /// # Errors
    /// Returns [`DataError::NonFinite`] when a level is zero or negative
    /// enough to produce a non-finite or undefined return.
    pub fn to_returns(&self, kind: ReturnKind) -> Result<ReturnPanel> {
        let n_obs = self.n_observations().saturating_sub(1);
        let mut values = Array2::<f64>::zeros((n_obs, self.n_instruments()));

        for (j, mut column) in values.columns_mut().into_iter().enumerate() {
            column.assign(&series_returns(self.column(j), kind));
        }

        let dates = self.dates().get(1..).map(<[_]>::to_vec).unwrap_or_default();
        let raw = self.values();
        for ((row, col), value) in values.indexed_iter() {
            let non_positive = raw[[row, col]] <= 0.0 || raw[[row + 1, col]] <= 0.0;
            if !value.is_finite() || (kind == ReturnKind::Log && non_positive) {
                return Err(DataError::NonFinite {
                    series: self.instruments()[col].clone(),
                    date: dates[row],
                });
            }
        }

        Ok(ReturnPanel::from_parts_unchecked(dates, self.instruments().to_vec(), values))
    }
}

impl MarketFactorSeries {
    /// Period returns of the series, dropping the first date.
    ///
    /// # Errors
    /// Returns [`DataError::NonFinite`] when a return is undefined.
    pub fn to_returns(&self, kind: ReturnKind) -> Result<Self> {
        let values = series_returns(self.values(), kind);
        let dates = self.dates().get(1..).map(<[_]>::to_vec).unwrap_or_default();
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(DataError::NonFinite {
                series: self.name().to_string(),
                date: dates[row],
            });
        }
        Ok(Self::from_parts_unchecked(self.name().to_string(), dates, values))
    }
}

/// The three aligned inputs of a selection run.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    /// Instrument returns
    pub returns: ReturnPanel,
    /// Market factor returns on the same dates
    pub market: MarketFactorSeries,
    /// Price levels trimmed to the return dates
    pub levels: PriceLevelPanel,
}

impl PipelineInputs {
    /// Derive returns from instrument and market levels that share one date
    /// index, and trim the level panel to the return dates.
    ///
    /// # Errors
    /// Fails when the market levels are not on the panel's dates or when a
    /// return is undefined.
    pub fn from_levels(
        levels: &PriceLevelPanel,
        market_levels: &MarketFactorSeries,
        kind: ReturnKind,
    ) -> Result<Self> {
        if levels.dates() != market_levels.dates() {
            return Err(DataError::DateIndexMismatch {
                left: market_levels.name().to_string(),
                right: "price level panel".to_string(),
            });
        }

        Ok(Self {
            returns: levels.to_returns(kind)?,
            market: market_levels.to_returns(kind)?,
            levels: levels.skip_observations(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::tests::dates;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    #[rstest]
    #[case(ReturnKind::Percent, 10.0)]
    #[case(ReturnKind::Simple, 0.1)]
    #[case(ReturnKind::Log, 1.1_f64.ln())]
    fn test_return_kinds(#[case] kind: ReturnKind, #[case] expected: f64) {
        assert_relative_eq!(kind.compute(100.0, 110.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("Percent".parse::<ReturnKind>().unwrap(), ReturnKind::Percent);
        assert_eq!("log".parse::<ReturnKind>().unwrap(), ReturnKind::Log);
        assert!("weekly".parse::<ReturnKind>().is_err());
    }

    #[test]
    fn test_panel_returns_drop_first_date() {
        let levels = PriceLevelPanel::new(
            dates(3),
            vec!["AAA".to_string(), "BBB".to_string()],
            array![[100.0, 50.0], [110.0, 55.0], [99.0, 55.0]],
        )
        .unwrap();

        let returns = levels.to_returns(ReturnKind::Percent).unwrap();
        assert_eq!(returns.dates(), &dates(3)[1..]);
        assert_relative_eq!(returns.values()[[0, 0]], 10.0, epsilon = 1e-10);
        assert_relative_eq!(returns.values()[[1, 0]], -10.0, epsilon = 1e-10);
        assert_relative_eq!(returns.values()[[1, 1]], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_level_rejected() {
        let levels = PriceLevelPanel::new(dates(2), vec!["AAA".to_string()], array![[0.0], [1.0]]).unwrap();
        assert!(matches!(levels.to_returns(ReturnKind::Simple), Err(DataError::NonFinite { .. })));
    }

    #[test]
    fn test_pipeline_inputs_alignment() {
        let levels = PriceLevelPanel::new(
            dates(4),
            vec!["AAA".to_string()],
            array![[1.0], [2.0], [3.0], [4.0]],
        )
        .unwrap();
        let market = MarketFactorSeries::new("MKT", dates(4), array![10.0, 11.0, 12.0, 13.0]).unwrap();

        let inputs = PipelineInputs::from_levels(&levels, &market, ReturnKind::Log).unwrap();
        assert_eq!(inputs.returns.dates(), inputs.market.dates());
        assert_eq!(inputs.returns.dates(), inputs.levels.dates());
        assert_eq!(inputs.levels.n_observations(), 3);
        assert_relative_eq!(inputs.levels.values()[[0, 0]], 2.0);
    }

    #[test]
    fn test_pipeline_inputs_date_mismatch() {
        let levels = PriceLevelPanel::new(dates(3), vec!["AAA".to_string()], array![[1.0], [2.0], [3.0]]).unwrap();
        let market = MarketFactorSeries::new("MKT", dates(3)[..2].to_vec(), array![1.0, 2.0]).unwrap();
        assert!(matches!(
            PipelineInputs::from_levels(&levels, &market, ReturnKind::Percent),
            Err(DataError::DateIndexMismatch { .. })
        ));
    }
}
