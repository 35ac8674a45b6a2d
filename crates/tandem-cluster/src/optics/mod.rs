//! OPTICS: Ordering Points To Identify the Clustering Structure.
//!
//! Ankerst, Breunig, Kriegel and Sander (1999). The ordering walks the data
//! always expanding the unprocessed point with the smallest reachability
//! distance; valleys in the resulting reachability plot are clusters.

mod dbscan;
mod xi;

use crate::error::ClusterError;
use crate::{DensityClusterer, Labels, NOISE, validate_distances};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How clusters are cut from the reachability plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extraction {
    /// Steep-area extraction with the configured `xi`
    Xi,
    /// Single reachability threshold, equivalent to DBSCAN
    Dbscan {
        /// Neighbourhood radius
        eps: f64,
    },
}

/// OPTICS parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticsConfig {
    /// Neighbourhood size, counting the point itself, for a core point
    pub min_samples: usize,
    /// Largest neighbourhood radius considered
    pub max_eps: f64,
    /// Minimum relative steepness of a cluster boundary
    pub xi: f64,
    /// Smallest cluster kept by xi extraction; `min_samples` when unset
    pub min_cluster_size: Option<usize>,
    /// Trim cluster ends that are not reachable from inside the cluster
    pub predecessor_correction: bool,
    /// Cluster extraction method
    pub extraction: Extraction,
}

impl Default for OpticsConfig {
    fn default() -> Self {
        Self {
            min_samples: 2,
            max_eps: f64::INFINITY,
            xi: 0.05,
            min_cluster_size: None,
            predecessor_correction: true,
            extraction: Extraction::Xi,
        }
    }
}

impl OpticsConfig {
    /// Default configuration with the given `min_samples`.
    pub fn with_min_samples(min_samples: usize) -> Self {
        Self {
            min_samples,
            ..Self::default()
        }
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    /// Returns [`ClusterError::InvalidParameter`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ClusterError> {
        if self.min_samples < 2 {
            return Err(ClusterError::InvalidParameter(format!(
                "min_samples must be at least 2, got {}",
                self.min_samples
            )));
        }
        if !(self.xi > 0.0 && self.xi < 1.0) {
            return Err(ClusterError::InvalidParameter(format!(
                "xi must be in (0, 1), got {}",
                self.xi
            )));
        }
        if self.max_eps.is_nan() || self.max_eps <= 0.0 {
            return Err(ClusterError::InvalidParameter(format!(
                "max_eps must be positive, got {}",
                self.max_eps
            )));
        }
        if let Some(size) = self.min_cluster_size {
            if size < 2 {
                return Err(ClusterError::InvalidParameter(format!(
                    "min_cluster_size must be at least 2, got {size}"
                )));
            }
        }
        if let Extraction::Dbscan { eps } = self.extraction {
            if !eps.is_finite() || eps <= 0.0 {
                return Err(ClusterError::InvalidParameter(format!(
                    "eps must be finite and positive, got {eps}"
                )));
            }
        }
        Ok(())
    }

    fn min_cluster_size(&self) -> usize {
        self.min_cluster_size.unwrap_or(self.min_samples)
    }
}

/// Fitted OPTICS ordering and the labels extracted from it.
///
/// Per-point vectors are indexed by the original point index.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticsModel {
    /// Points in visiting order
    pub ordering: Vec<usize>,
    /// Reachability distance of each point; `inf` when undefined
    pub reachability: Vec<f64>,
    /// Core distance of each point; `inf` for non-core points
    pub core_distances: Vec<f64>,
    /// Point from which each point was reached
    pub predecessor: Vec<Option<usize>>,
    /// Cluster label of each point
    pub labels: Labels,
}

impl OpticsModel {
    /// Reachability distances in visiting order.
    pub fn reachability_plot(&self) -> Vec<f64> {
        self.ordering.iter().map(|&p| self.reachability[p]).collect()
    }

    /// Number of distinct non-noise labels.
    pub fn n_clusters(&self) -> usize {
        self.labels
            .iter()
            .copied()
            .filter(|&l| l != NOISE)
            .max()
            .map_or(0, |max| max as usize + 1)
    }
}

/// OPTICS clusterer over precomputed distances.
#[derive(Debug, Clone, Default)]
pub struct Optics {
    config: OpticsConfig,
}

impl Optics {
    /// Create a clusterer.
    pub const fn new(config: OpticsConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &OpticsConfig {
        &self.config
    }

    /// Compute the ordering and extract labels.
    ///
    /// # Errors
    /// Fails on an invalid configuration or distance matrix.
    pub fn fit(&self, distances: ArrayView2<'_, f64>) -> Result<OpticsModel, ClusterError> {
        self.config.validate()?;
        validate_distances(distances)?;

        let n = distances.nrows();
        let core_distances = core_distances(distances, self.config.min_samples, self.config.max_eps);
        let (ordering, reachability, predecessor) =
            order_points(distances, &core_distances, self.config.max_eps);

        let labels = if n < self.config.min_samples {
            vec![NOISE; n]
        } else {
            match self.config.extraction {
                Extraction::Xi => xi::extract(
                    &ordering,
                    &reachability,
                    &predecessor,
                    &xi::XiParams {
                        xi: self.config.xi,
                        min_samples: self.config.min_samples,
                        min_cluster_size: self.config.min_cluster_size(),
                        predecessor_correction: self.config.predecessor_correction,
                    },
                ),
                Extraction::Dbscan { eps } => {
                    dbscan::extract(&ordering, &reachability, &core_distances, eps)
                }
            }
        };

        let model = OpticsModel {
            ordering,
            reachability,
            core_distances,
            predecessor,
            labels,
        };
        debug!(
            points = n,
            clusters = model.n_clusters(),
            noise = model.labels.iter().filter(|&&l| l == NOISE).count(),
            "OPTICS fit complete"
        );
        Ok(model)
    }
}

impl DensityClusterer for Optics {
    fn fit_predict(&self, distances: ArrayView2<'_, f64>) -> Result<Labels, ClusterError> {
        Ok(self.fit(distances)?.labels)
    }

    fn name(&self) -> &'static str {
        "optics"
    }
}

/// Distance to the `min_samples`-th nearest point, the point itself
/// included; `inf` when that exceeds `max_eps`.
fn core_distances(distances: ArrayView2<'_, f64>, min_samples: usize, max_eps: f64) -> Vec<f64> {
    let n = distances.nrows();
    if n < min_samples {
        return vec![f64::INFINITY; n];
    }
    distances
        .rows()
        .into_iter()
        .map(|row| {
            let mut sorted = row.to_vec();
            sorted.sort_by(f64::total_cmp);
            let core = sorted[min_samples - 1];
            if core > max_eps { f64::INFINITY } else { core }
        })
        .collect()
}

/// Rounding applied to reachability candidates, in decimal places.
const REACHABILITY_DECIMALS: i32 = 15;

fn round_reachability(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(REACHABILITY_DECIMALS);
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() { rounded } else { value }
}

type Walk = (Vec<usize>, Vec<f64>, Vec<Option<usize>>);

fn order_points(distances: ArrayView2<'_, f64>, core: &[f64], max_eps: f64) -> Walk {
    let n = distances.nrows();
    let mut reachability = vec![f64::INFINITY; n];
    let mut predecessor = vec![None; n];
    let mut processed = vec![false; n];
    let mut ordering = Vec::with_capacity(n);

    for _ in 0..n {
        // Smallest reachability among unprocessed points; ties to the lowest index.
        let mut point = None;
        for candidate in (0..n).filter(|&i| !processed[i]) {
            match point {
                Some(best) if reachability[candidate] >= reachability[best] => {}
                _ => point = Some(candidate),
            }
        }
        let Some(point) = point else { break };

        processed[point] = true;
        ordering.push(point);

        if core[point].is_infinite() {
            continue;
        }
        for other in 0..n {
            if processed[other] || distances[[point, other]] > max_eps {
                continue;
            }
            let candidate = round_reachability(distances[[point, other]].max(core[point]));
            if candidate < reachability[other] {
                reachability[other] = candidate;
                predecessor[other] = Some(point);
            }
        }
    }

    (ordering, reachability, predecessor)
}
