//! Export and report round trips over a hand-built selection.

use chrono::NaiveDate;
use ndarray::Array2;
use tandem_data::{MarketFactorSeries, PriceLevelPanel, ReturnPanel};
use tandem_output::{
    ExportFormat, Exporter, PairReport, PairRow, assignment_frame, pair_table_frame,
};
use tandem_select::{ClusterAssignment, CointegrationResult, PairSelector, PairTable};
use tandem_stats::CriticalValues;

fn critical_values() -> CriticalValues {
    CriticalValues {
        one_percent: -3.90,
        five_percent: -3.34,
        ten_percent: -3.04,
    }
}

fn table() -> PairTable {
    PairTable::new(vec![
        CointegrationResult {
            first: "AAA".to_string(),
            second: "BBB".to_string(),
            pvalue: 0.001,
            hedge_ratio: 1.5,
            half_life: Some(4.2),
            cluster: 0,
            statistic: -4.8,
            critical_values: critical_values(),
            nobs: 250,
        },
        CointegrationResult {
            first: "CCC".to_string(),
            second: "DDD".to_string(),
            pvalue: 0.03,
            hedge_ratio: 0.8,
            half_life: None,
            cluster: 1,
            statistic: -3.5,
            critical_values: critical_values(),
            nobs: 250,
        },
    ])
}

#[test]
fn test_pair_table_csv() {
    let csv = table().export_to_string(ExportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "first,second,pvalue,hedge_ratio,half_life,cluster,statistic,critical_1pct,critical_5pct,critical_10pct,nobs"
    );
    assert!(lines[1].starts_with("AAA,BBB,0.001,1.5,4.2,0,"));
    // Undefined half-life is an empty field
    assert!(lines[2].starts_with("CCC,DDD,0.03,0.8,,1,"));

    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let rows: Vec<PairRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows[1].half_life, None);
    assert_eq!(rows[0].critical_5pct, -3.34);
}

#[test]
fn test_pair_table_json() {
    let json = table().export_to_string(ExportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["first"], "AAA");
    assert_eq!(rows[0]["critical_values"]["five_percent"], -3.34);
    assert!(rows[1]["half_life"].is_null());

    let pretty = table().export_to_string(ExportFormat::PrettyJson).unwrap();
    assert!(pretty.contains('\n'));
    assert_eq!(serde_json::from_str::<serde_json::Value>(&pretty).unwrap(), value);
}

#[test]
fn test_export_to_file() {
    let path = std::env::temp_dir().join(format!("tandem_pairs_{}.csv", std::process::id()));
    table().export_to_file(&path, ExportFormat::Csv).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("CCC,DDD"));
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_frames() {
    let frame = pair_table_frame(&table()).unwrap();
    assert_eq!(frame.height(), 2);
    assert_eq!(
        frame.get_column_names_str(),
        vec!["first", "second", "pvalue", "hedge_ratio", "half_life", "cluster", "statistic", "nobs"]
    );
    assert_eq!(frame.column("half_life").unwrap().null_count(), 1);

    let assignment = ClusterAssignment::new(
        vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()],
        vec![0, 0, -1],
    )
    .unwrap();
    let frame = assignment_frame(&assignment).unwrap();
    assert_eq!(frame.shape(), (3, 2));
}

fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    (0..n).map(|i| start + chrono::Duration::days(i as i64)).collect()
}

#[test]
fn test_report_from_run() {
    // Two tight pairs of returns far from each other; levels are irrelevant
    // for the report layout.
    let n = 12;
    let base: Vec<f64> = (0..n).map(|t| ((t * 5) % 7) as f64 - 3.0).collect();
    let other: Vec<f64> = (0..n).map(|t| ((t * 3) % 11) as f64 - 5.0).collect();
    let returns = Array2::from_shape_fn((n, 4), |(t, j)| match j {
        0 => base[t],
        1 => base[t] * 1.1 + 0.01 * (t % 2) as f64,
        2 => other[t],
        _ => other[t] * 0.9 - 0.01 * (t % 3) as f64,
    });
    let names: Vec<String> = ["AAA", "BBB", "CCC", "DDD"].iter().map(|s| s.to_string()).collect();
    let levels = returns.mapv(|r| 100.0 + r);
    let returns = ReturnPanel::new(dates(n), names.clone(), returns).unwrap();
    let levels = PriceLevelPanel::new(dates(n), names, levels).unwrap();
    let market = MarketFactorSeries::new(
        "MKT",
        dates(n),
        ndarray::Array1::from_iter((0..n).map(|t| ((t * 7) % 5) as f64)),
    )
    .unwrap();

    let outcome = PairSelector::default().run(&returns, &market, &levels).unwrap();
    let report = PairReport::new("Pairs", &outcome, 0.05).with_period(dates(n)[0], dates(n)[n - 1]);

    assert_eq!(report.summary.instruments, 4);
    assert_eq!(report.summary.candidates, outcome.candidates.len());
    assert_eq!(report.summary.accepted, outcome.table.len());
    assert_eq!(report.summary.noise + report.clusters.iter().map(|c| c.members.len()).sum::<usize>(), 4);

    let ascii = report.to_ascii_table();
    assert!(ascii.contains("Pairs"));
    assert!(ascii.contains("Period: 2024-03-01 to 2024-03-12"));
    assert!(ascii.contains("Candidate pairs:"));

    let markdown = report.to_markdown();
    assert!(markdown.starts_with("# Pairs"));
    assert!(markdown.contains("## Accepted Pairs"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["summary"]["instruments"], 4);
}
