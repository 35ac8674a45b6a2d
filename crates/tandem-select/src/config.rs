//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use tandem_cluster::OpticsConfig;
use tandem_stats::LagSelection;

/// Default OPTICS neighbourhood cap on the `1 - |partial correlation|`
/// distance. An instrument whose nearest neighbour is farther than this
/// (partial correlation below 0.3 in magnitude) has no dense neighbourhood
/// and is labelled noise.
pub const DEFAULT_MAX_EPS: f64 = 0.7;

/// Settings of a selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Neighbourhood size for a core point in the density clustering
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Pairs are accepted when the Engle-Granger p-value is strictly below this
    #[serde(default = "default_pvalue_threshold")]
    pub pvalue_threshold: f64,

    /// OPTICS xi steepness
    #[serde(default = "default_xi")]
    pub xi: f64,

    /// OPTICS neighbourhood cap; `null` in JSON for unbounded
    #[serde(
        default = "default_max_eps",
        serialize_with = "serialize_max_eps",
        deserialize_with = "deserialize_max_eps"
    )]
    pub max_eps: f64,

    /// Lag policy of the residual unit-root regression
    #[serde(default)]
    pub cointegration_lags: LagSelection,

    /// Test at most this many candidates, in generation order
    #[serde(default)]
    pub max_candidate_pairs: Option<usize>,

    /// Use the rayon pool for the distance and cointegration stages
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

const fn default_min_samples() -> usize {
    2
}

const fn default_pvalue_threshold() -> f64 {
    0.05
}

const fn default_xi() -> f64 {
    0.05
}

const fn default_max_eps() -> f64 {
    DEFAULT_MAX_EPS
}

const fn default_parallel() -> bool {
    true
}

fn serialize_max_eps<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if value.is_finite() {
        serializer.serialize_some(value)
    } else {
        serializer.serialize_none()
    }
}

fn deserialize_max_eps<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            pvalue_threshold: default_pvalue_threshold(),
            xi: default_xi(),
            max_eps: default_max_eps(),
            cointegration_lags: LagSelection::default(),
            max_candidate_pairs: None,
            parallel: default_parallel(),
        }
    }
}

impl SelectionConfig {
    /// Defaults with the two parameters of the basic selection call.
    pub fn new(min_samples: usize, pvalue_threshold: f64) -> Self {
        Self {
            min_samples,
            pvalue_threshold,
            ..Self::default()
        }
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_samples < 2 {
            return Err(format!("min_samples must be at least 2, got {}", self.min_samples));
        }
        if !(self.pvalue_threshold > 0.0 && self.pvalue_threshold <= 1.0) {
            return Err(format!(
                "pvalue_threshold must be in (0, 1], got {}",
                self.pvalue_threshold
            ));
        }
        if !(self.xi > 0.0 && self.xi < 1.0) {
            return Err(format!("xi must be in (0, 1), got {}", self.xi));
        }
        if self.max_eps.is_nan() || self.max_eps <= 0.0 {
            return Err(format!("max_eps must be positive, got {}", self.max_eps));
        }
        if self.max_candidate_pairs == Some(0) {
            return Err("max_candidate_pairs must be positive when set".to_string());
        }
        Ok(())
    }

    /// Clustering parameters derived from this configuration.
    pub fn optics_config(&self) -> OpticsConfig {
        OpticsConfig {
            min_samples: self.min_samples,
            max_eps: self.max_eps,
            xi: self.xi,
            ..OpticsConfig::default()
        }
    }
}
