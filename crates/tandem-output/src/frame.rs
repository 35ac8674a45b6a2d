//! Polars frames of selection results.

use crate::export::pair_rows;
use polars::prelude::*;
use tandem_select::{ClusterAssignment, PairTable};

/// One row per accepted pair: `first`, `second`, `pvalue`, `hedge_ratio`,
/// `half_life` (null when undefined), `cluster`, `statistic`, `nobs`.
///
/// # Errors
/// Propagates frame construction errors.
pub fn pair_table_frame(table: &PairTable) -> PolarsResult<DataFrame> {
    let rows = pair_rows(table);
    let firsts: Vec<&str> = rows.iter().map(|r| r.first.as_str()).collect();
    let seconds: Vec<&str> = rows.iter().map(|r| r.second.as_str()).collect();
    let pvalues: Vec<f64> = rows.iter().map(|r| r.pvalue).collect();
    let hedge_ratios: Vec<f64> = rows.iter().map(|r| r.hedge_ratio).collect();
    let half_lives: Vec<Option<f64>> = rows.iter().map(|r| r.half_life).collect();
    let clusters: Vec<i64> = rows.iter().map(|r| r.cluster).collect();
    let statistics: Vec<f64> = rows.iter().map(|r| r.statistic).collect();
    let nobs: Vec<u64> = rows.iter().map(|r| r.nobs as u64).collect();

    DataFrame::new(vec![
        Series::new("first".into(), firsts).into(),
        Series::new("second".into(), seconds).into(),
        Series::new("pvalue".into(), pvalues).into(),
        Series::new("hedge_ratio".into(), hedge_ratios).into(),
        Series::new("half_life".into(), half_lives).into(),
        Series::new("cluster".into(), clusters).into(),
        Series::new("statistic".into(), statistics).into(),
        Series::new("nobs".into(), nobs).into(),
    ])
}

/// One row per instrument: `instrument`, `label`.
///
/// # Errors
/// Propagates frame construction errors.
pub fn assignment_frame(assignment: &ClusterAssignment) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new("instrument".into(), assignment.instruments().to_vec()).into(),
        Series::new("label".into(), assignment.labels().to_vec()).into(),
    ])
}
