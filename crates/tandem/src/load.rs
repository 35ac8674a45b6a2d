//! Loading pipeline inputs from a wide price file.

use crate::Error;
use std::path::Path;
use tandem_data::{PipelineInputs, PriceTable, ReturnKind};
use tandem_select::{PairSelector, SelectionConfig, SelectionOutcome};
use tracing::info;

/// Read a wide CSV of price levels, split off the market column and derive
/// returns of `kind` for both.
///
/// # Errors
/// Fails when the file cannot be read or parsed, the market column is
/// missing, or a return is undefined.
pub fn load_inputs(path: impl AsRef<Path>, market: &str, kind: ReturnKind) -> Result<PipelineInputs, Error> {
    let path = path.as_ref();
    let table = PriceTable::from_path(path)?;
    info!(
        path = %path.display(),
        observations = table.n_observations(),
        columns = table.names().len(),
        "loaded price table"
    );
    let (levels, market_levels) = table.split_market(market)?;
    Ok(PipelineInputs::from_levels(&levels, &market_levels, kind)?)
}

/// Load a wide price file and run the selection on it with `config`.
///
/// Returns the loaded inputs alongside the outcome so callers can report
/// the sample period.
///
/// # Errors
/// Fails as [`load_inputs`] does, or when the selection rejects its
/// configuration or inputs.
pub fn select_from_path(
    path: impl AsRef<Path>,
    market: &str,
    kind: ReturnKind,
    config: SelectionConfig,
) -> Result<(PipelineInputs, SelectionOutcome), Error> {
    let inputs = load_inputs(path, market, kind)?;
    let outcome = PairSelector::new(config).run(&inputs.returns, &inputs.market, &inputs.levels)?;
    Ok((inputs, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tandem_data::DataError;
    use tandem_select::SelectionError;

    const PRICES: &str = "date,AAA,BBB,CCC,MKT
2024-01-02,10,20,30,100
2024-01-03,11,22,29,101
2024-01-04,12,21,31,99
2024-01-05,11,23,30,102
2024-01-08,13,24,32,100
2024-01-09,12,22,31,103
";

    fn write_prices(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("tandem_{name}_{}.csv", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[rstest]
    #[case(ReturnKind::Percent)]
    #[case(ReturnKind::Simple)]
    #[case(ReturnKind::Log)]
    fn test_load_inputs(#[case] kind: ReturnKind) {
        let path = write_prices(
            &format!("load_{kind:?}"),
            "date,AAA,BBB,MKT\n2024-01-02,10,20,100\n2024-01-03,11,22,101\n2024-01-04,12,21,99\n",
        );
        let inputs = load_inputs(&path, "MKT", kind).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(inputs.returns.n_instruments(), 2);
        assert_eq!(inputs.returns.n_observations(), 2);
        assert_eq!(inputs.market.values().len(), 2);
        assert_eq!(inputs.levels.n_observations(), 2);
    }

    #[test]
    fn test_missing_market_column() {
        let path = write_prices("nomarket", "date,AAA,BBB\n2024-01-02,10,20\n2024-01-03,11,22\n");
        let err = load_inputs(&path, "MKT", ReturnKind::Percent).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, Error::Data(DataError::MissingColumn(_))));
    }

    #[test]
    fn test_select_from_path() {
        let path = write_prices("select", PRICES);
        let (inputs, outcome) =
            select_from_path(&path, "MKT", ReturnKind::Percent, SelectionConfig::default()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(inputs.returns.n_observations(), 5);
        assert_eq!(outcome.assignment.instruments(), ["AAA", "BBB", "CCC"]);
        assert_eq!(outcome.distances.len(), 3);
    }

    #[test]
    fn test_select_from_path_rejects_bad_config() {
        let path = write_prices("badconfig", PRICES);
        let config = SelectionConfig::new(1, 0.05);
        let err = select_from_path(&path, "MKT", ReturnKind::Percent, config).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, Error::Selection(SelectionError::InvalidConfig(_))));
    }
}
