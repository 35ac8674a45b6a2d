//! The accepted-pair table.

use crate::cointegration::CointegrationResult;
use serde::Serialize;

/// Accepted pairs in candidate order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PairTable {
    results: Vec<CointegrationResult>,
}

impl PairTable {
    /// Wrap results.
    pub const fn new(results: Vec<CointegrationResult>) -> Self {
        Self { results }
    }

    /// Rows.
    pub fn results(&self) -> &[CointegrationResult] {
        &self.results
    }

    /// Iterate rows.
    pub fn iter(&self) -> std::slice::Iter<'_, CointegrationResult> {
        self.results.iter()
    }

    /// Number of accepted pairs.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when nothing was accepted.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Row for a pair, in either orientation.
    pub fn find(&self, a: &str, b: &str) -> Option<&CointegrationResult> {
        self.results
            .iter()
            .find(|r| (r.first == a && r.second == b) || (r.first == b && r.second == a))
    }

    /// Unwrap into rows.
    pub fn into_inner(self) -> Vec<CointegrationResult> {
        self.results
    }
}

impl FromIterator<CointegrationResult> for PairTable {
    fn from_iter<I: IntoIterator<Item = CointegrationResult>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PairTable {
    type Item = &'a CointegrationResult;
    type IntoIter = std::slice::Iter<'a, CointegrationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl IntoIterator for PairTable {
    type Item = CointegrationResult;
    type IntoIter = std::vec::IntoIter<CointegrationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
