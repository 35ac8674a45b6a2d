//! Candidate pairs within clusters.

use crate::clusters::ClusterAssignment;
use serde::Serialize;
use tracing::debug;

/// Unordered pair of distinct instruments from one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CandidatePair {
    /// Instrument appearing first in the universe
    pub first: String,
    /// Instrument appearing later in the universe
    pub second: String,
    /// Shared cluster label
    pub cluster: i64,
}

/// Every 2-combination of members within each cluster.
///
/// Clusters come in ascending label order; within a cluster, combinations
/// follow instrument order: `(m0, m1), (m0, m2), ..., (m1, m2), ...`.
pub fn generate_pairs(assignment: &ClusterAssignment) -> Vec<CandidatePair> {
    let mut pairs = Vec::new();
    for cluster in assignment.clusters() {
        let members = &cluster.members;
        for (i, first) in members.iter().enumerate() {
            for second in &members[i + 1..] {
                pairs.push(CandidatePair {
                    first: (*first).to_string(),
                    second: (*second).to_string(),
                    cluster: cluster.label,
                });
            }
        }
        debug!(
            cluster = cluster.label,
            size = members.len(),
            pairs = members.len() * members.len().saturating_sub(1) / 2,
            "cluster pairs generated"
        );
    }
    pairs
}
