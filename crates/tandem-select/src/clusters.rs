//! Cluster assignment of instruments.

use crate::config::DEFAULT_MAX_EPS;
use crate::distance::DistanceMatrix;
use crate::error::{InputShapeError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tandem_cluster::{DensityClusterer, Labels, NOISE, Optics, OpticsConfig};
use tracing::info;

/// Instrument-to-label mapping in distance-matrix order; [`NOISE`] marks
/// instruments outside every cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    instruments: Vec<String>,
    labels: Labels,
}

/// One cluster and its members in instrument order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster<'a> {
    /// Non-negative label
    pub label: i64,
    /// Member ids
    pub members: Vec<&'a str>,
}

impl ClusterAssignment {
    /// Pair instruments with labels.
    ///
    /// # Errors
    /// Returns [`InputShapeError::LengthMismatch`] when the lengths differ.
    pub fn new(instruments: Vec<String>, labels: Labels) -> Result<Self> {
        if instruments.len() != labels.len() {
            return Err(InputShapeError::LengthMismatch {
                what: "cluster labels",
                expected: instruments.len(),
                actual: labels.len(),
            }
            .into());
        }
        Ok(Self { instruments, labels })
    }

    /// Instruments in order.
    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// Labels in instrument order.
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Label of an instrument.
    pub fn label(&self, instrument: &str) -> Option<i64> {
        self.instruments
            .iter()
            .position(|s| s == instrument)
            .map(|i| self.labels[i])
    }

    /// `(instrument, label)` pairs in instrument order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.instruments.iter().map(String::as_str).zip(self.labels.iter().copied())
    }

    /// Non-noise clusters by ascending label.
    pub fn clusters(&self) -> Vec<Cluster<'_>> {
        let mut groups: BTreeMap<i64, Vec<&str>> = BTreeMap::new();
        for (instrument, label) in self.iter().filter(|&(_, l)| l != NOISE) {
            groups.entry(label).or_default().push(instrument);
        }
        groups
            .into_iter()
            .map(|(label, members)| Cluster { label, members })
            .collect()
    }

    /// Instruments labelled as noise.
    pub fn noise(&self) -> Vec<&str> {
        self.iter()
            .filter(|&(_, l)| l == NOISE)
            .map(|(s, _)| s)
            .collect()
    }

    /// Number of distinct non-noise labels.
    pub fn n_clusters(&self) -> usize {
        self.clusters().len()
    }
}

/// Cluster the instruments of a distance matrix with any clusterer.
///
/// # Errors
/// Propagates the clusterer's error.
pub fn cluster_with<C>(clusterer: &C, distances: &DistanceMatrix) -> Result<ClusterAssignment>
where
    C: DensityClusterer + ?Sized,
{
    let labels = clusterer.fit_predict(distances.view())?;
    let assignment = ClusterAssignment::new(distances.instruments().to_vec(), labels)?;
    info!(
        clusterer = clusterer.name(),
        instruments = assignment.instruments.len(),
        clusters = assignment.n_clusters(),
        noise = assignment.noise().len(),
        "instruments clustered"
    );
    Ok(assignment)
}

/// Cluster with OPTICS defaults, the given `min_samples` and the
/// [`DEFAULT_MAX_EPS`] neighbourhood cap.
///
/// # Errors
/// Fails when `min_samples < 2` or the matrix is invalid.
pub fn cluster(distances: &DistanceMatrix, min_samples: usize) -> Result<ClusterAssignment> {
    let config = OpticsConfig {
        max_eps: DEFAULT_MAX_EPS,
        ..OpticsConfig::with_min_samples(min_samples)
    };
    cluster_with(&Optics::new(config), distances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectionError;

    fn assignment() -> ClusterAssignment {
        ClusterAssignment::new(
            ["A", "B", "C", "D", "E", "F"].iter().map(|s| s.to_string()).collect(),
            vec![1, NOISE, 0, 1, 0, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_clusters_ascending_with_members_in_order() {
        let a = assignment();
        let clusters = a.clusters();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0], Cluster { label: 0, members: vec!["C", "E"] });
        assert_eq!(clusters[1], Cluster { label: 1, members: vec!["A", "D", "F"] });
        assert_eq!(a.noise(), vec!["B"]);
        assert_eq!(a.n_clusters(), 2);
    }

    #[test]
    fn test_label_lookup() {
        let a = assignment();
        assert_eq!(a.label("D"), Some(1));
        assert_eq!(a.label("B"), Some(NOISE));
        assert_eq!(a.label("Z"), None);
    }

    #[test]
    fn test_length_mismatch() {
        let result = ClusterAssignment::new(vec!["A".to_string()], vec![0, 1]);
        assert!(matches!(result, Err(SelectionError::InputShape(_))));
    }
}
