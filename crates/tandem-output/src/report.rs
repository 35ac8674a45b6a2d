//! Human-readable reports of a selection run.

use crate::export::{PairRow, pair_rows};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tandem_select::{ClusterAssignment, SelectionOutcome};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stage counts of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SelectionSummary {
    /// Instruments in the universe.
    pub instruments: usize,
    /// Non-noise clusters.
    pub clusters: usize,
    /// Instruments labelled noise.
    pub noise: usize,
    /// Candidate pairs generated.
    pub candidates: usize,
    /// Candidates tested.
    pub tested: usize,
    /// Pairs accepted.
    pub accepted: usize,
    /// Acceptance threshold.
    pub pvalue_threshold: f64,
}

/// One cluster with its members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterSummary {
    /// Cluster label.
    pub label: i64,
    /// Members in instrument order.
    pub members: Vec<String>,
}

fn cluster_summaries(assignment: &ClusterAssignment) -> Vec<ClusterSummary> {
    assignment
        .clusters()
        .into_iter()
        .map(|c| ClusterSummary {
            label: c.label,
            members: c.members.into_iter().map(str::to_string).collect(),
        })
        .collect()
}

/// Report of a selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairReport {
    /// Report title.
    pub title: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// First and last observation date, when known.
    pub period: Option<(NaiveDate, NaiveDate)>,

    /// Stage counts.
    pub summary: SelectionSummary,

    /// Clusters in label order.
    pub clusters: Vec<ClusterSummary>,

    /// Instruments labelled noise.
    pub noise: Vec<String>,

    /// Accepted pairs.
    pub pairs: Vec<PairRow>,
}

impl PairReport {
    /// Build a report from a run.
    pub fn new(title: impl Into<String>, outcome: &SelectionOutcome, pvalue_threshold: f64) -> Self {
        let assignment = &outcome.assignment;
        let noise: Vec<String> = assignment.noise().into_iter().map(str::to_string).collect();
        Self {
            title: title.into(),
            timestamp: Utc::now(),
            period: None,
            summary: SelectionSummary {
                instruments: assignment.instruments().len(),
                clusters: assignment.n_clusters(),
                noise: noise.len(),
                candidates: outcome.candidates.len(),
                tested: outcome.tested,
                accepted: outcome.table.len(),
                pvalue_threshold,
            },
            clusters: cluster_summaries(assignment),
            noise,
            pairs: pair_rows(&outcome.table),
        }
    }

    /// Set the sample period.
    pub const fn with_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some((start, end));
        self
    }

    /// Convert report to JSON string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as a plain-text table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        let s = &self.summary;

        output.push_str(&format!("\n{}\n", self.title));
        if let Some((start, end)) = self.period {
            output.push_str(&format!("Period: {start} to {end}\n"));
        }
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output.push_str("\nSummary:\n");
        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!("  Instruments:              {}\n", s.instruments));
        output.push_str(&format!("  Clusters:                 {}\n", s.clusters));
        output.push_str(&format!("  Noise:                    {}\n", s.noise));
        output.push_str(&format!("  Candidate pairs:          {}\n", s.candidates));
        if s.tested < s.candidates {
            output.push_str(&format!("  Tested (capped):          {}\n", s.tested));
        }
        output.push_str(&format!(
            "  Accepted (p < {}):     {}\n",
            s.pvalue_threshold, s.accepted
        ));

        if !self.clusters.is_empty() {
            output.push_str("\nClusters:\n");
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for cluster in &self.clusters {
                output.push_str(&format!("  {:>4}  {}\n", cluster.label, cluster.members.join(", ")));
            }
        }

        output.push_str("\nAccepted Pairs:\n");
        output.push_str(&"-".repeat(80));
        output.push('\n');
        if self.pairs.is_empty() {
            output.push_str("  (none)\n");
        } else {
            output.push_str(&format!(
                "  {:<12} {:<12} {:>10} {:>12} {:>10} {:>8}\n",
                "First", "Second", "p-value", "Hedge Ratio", "Half-Life", "Cluster"
            ));
            for pair in &self.pairs {
                output.push_str(&format!(
                    "  {:<12} {:<12} {:>10.4} {:>12.4} {:>10} {:>8}\n",
                    pair.first,
                    pair.second,
                    pair.pvalue,
                    pair.hedge_ratio,
                    format_half_life(pair.half_life),
                    pair.cluster
                ));
            }
        }
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output
    }

    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        let s = &self.summary;

        output.push_str(&format!("# {}\n\n", self.title));
        if let Some((start, end)) = self.period {
            output.push_str(&format!("**Period:** {start} to {end}\n\n"));
        }

        output.push_str("## Summary\n\n");
        output.push_str(&format!("- **Instruments:** {}\n", s.instruments));
        output.push_str(&format!("- **Clusters:** {}\n", s.clusters));
        output.push_str(&format!("- **Noise:** {}\n", s.noise));
        output.push_str(&format!("- **Candidate pairs:** {}\n", s.candidates));
        if s.tested < s.candidates {
            output.push_str(&format!("- **Tested (capped):** {}\n", s.tested));
        }
        output.push_str(&format!(
            "- **Accepted (p < {}):** {}\n\n",
            s.pvalue_threshold, s.accepted
        ));

        if !self.clusters.is_empty() {
            output.push_str("## Clusters\n\n");
            output.push_str("| Cluster | Members |\n");
            output.push_str("|---------|---------|\n");
            for cluster in &self.clusters {
                output.push_str(&format!("| {} | {} |\n", cluster.label, cluster.members.join(", ")));
            }
            output.push('\n');
        }

        output.push_str("## Accepted Pairs\n\n");
        if self.pairs.is_empty() {
            output.push_str("No pair passed the cointegration test.\n");
        } else {
            output.push_str("| First | Second | p-value | Hedge Ratio | Half-Life | Cluster |\n");
            output.push_str("|-------|--------|---------|-------------|-----------|---------|\n");
            for pair in &self.pairs {
                output.push_str(&format!(
                    "| {} | {} | {:.4} | {:.4} | {} | {} |\n",
                    pair.first,
                    pair.second,
                    pair.pvalue,
                    pair.hedge_ratio,
                    format_half_life(pair.half_life),
                    pair.cluster
                ));
            }
        }

        output
    }
}

fn format_half_life(half_life: Option<f64>) -> String {
    half_life.map_or_else(|| "n/a".to_string(), |h| format!("{h:.2}"))
}
