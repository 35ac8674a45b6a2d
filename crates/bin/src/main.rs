//! Tandem CLI binary.
//!
//! Loads a wide CSV of price levels and runs pairs selection on it.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tandem::cluster::Optics;
use tandem::output::{ExportFormat, Exporter, PairReport};
use tandem::select::{ClusterAssignment, DistanceEngine, SelectionConfig, check_inputs, cluster_with};
use tandem::{PipelineInputs, ReturnKind, load_inputs, select_from_path};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Tandem: pairs selection by density clustering and cointegration", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select cointegrated pairs
    Select {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print the cluster assignment only
    Clusters {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Wide CSV of price levels: a date column, then one column per instrument
    #[arg(long)]
    prices: PathBuf,

    /// Column holding the market factor levels
    #[arg(long)]
    market: String,

    /// Return definition (percent, simple or log)
    #[arg(long, default_value = "percent")]
    returns: ReturnKind,

    /// OPTICS min_samples
    #[arg(long)]
    min_samples: Option<usize>,

    /// Acceptance threshold on the Engle-Granger p-value
    #[arg(long)]
    pvalue: Option<f64>,

    /// OPTICS xi steepness
    #[arg(long)]
    xi: Option<f64>,

    /// OPTICS neighbourhood cap on the distance; `inf` for unbounded
    #[arg(long)]
    max_eps: Option<f64>,

    /// Test at most this many candidate pairs
    #[arg(long)]
    max_pairs: Option<usize>,

    /// Disable parallel distance and cointegration stages
    #[arg(long)]
    sequential: bool,

    /// JSON file with a selection configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
    Csv,
}

impl InputArgs {
    fn selection_config(&self) -> Result<SelectionConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
                serde_json::from_str::<SelectionConfig>(&content)
                    .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?
            }
            None => SelectionConfig::default(),
        };

        if let Some(min_samples) = self.min_samples {
            config.min_samples = min_samples;
        }
        if let Some(pvalue) = self.pvalue {
            config.pvalue_threshold = pvalue;
        }
        if let Some(xi) = self.xi {
            config.xi = xi;
        }
        if let Some(max_eps) = self.max_eps {
            config.max_eps = max_eps;
        }
        if self.max_pairs.is_some() {
            config.max_candidate_pairs = self.max_pairs;
        }
        if self.sequential {
            config.parallel = false;
        }

        config.validate().map_err(|e| format!("Invalid configuration: {}", e))?;
        Ok(config)
    }

    fn load(&self) -> Result<PipelineInputs, Box<dyn std::error::Error>> {
        Ok(load_inputs(&self.prices, &self.market, self.returns)?)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Select { input } => select(&input)?,
        Commands::Clusters { input } => clusters(&input)?,
    }

    Ok(())
}

fn select(input: &InputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = input.selection_config()?;
    let threshold = config.pvalue_threshold;
    let (inputs, outcome) = select_from_path(&input.prices, &input.market, input.returns, config)?;

    let content = match input.format {
        OutputFormat::Csv => outcome.table.export_to_string(ExportFormat::Csv)?,
        format => {
            let dates = inputs.returns.dates();
            let mut report = PairReport::new("Pairs Selection", &outcome, threshold);
            if let (Some(&start), Some(&end)) = (dates.first(), dates.last()) {
                report = report.with_period(start, end);
            }
            match format {
                OutputFormat::Markdown => report.to_markdown(),
                OutputFormat::Json => report.to_json()?,
                _ => report.to_ascii_table(),
            }
        }
    };

    emit(&content, input.output.as_deref())
}

fn clusters(input: &InputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = input.selection_config()?;
    let inputs = input.load()?;
    check_inputs(&inputs.returns, &inputs.market, &inputs.levels)?;

    let distances = DistanceEngine::new(config.parallel).compute(&inputs.returns, &inputs.market)?;
    let assignment = cluster_with(&Optics::new(config.optics_config()), &distances)?;
    info!(clusters = assignment.n_clusters(), noise = assignment.noise().len(), "clustered universe");

    let content = match input.format {
        OutputFormat::Text => assignment_text(&assignment),
        OutputFormat::Markdown => assignment_markdown(&assignment),
        OutputFormat::Json => assignment.export_to_string(ExportFormat::PrettyJson)?,
        OutputFormat::Csv => assignment.export_to_string(ExportFormat::Csv)?,
    };

    emit(&content, input.output.as_deref())
}

fn assignment_text(assignment: &ClusterAssignment) -> String {
    let mut output = String::new();
    output.push_str(&format!("\nClusters ({}):\n", assignment.n_clusters()));
    output.push_str(&"-".repeat(80));
    output.push('\n');
    for cluster in assignment.clusters() {
        output.push_str(&format!("  {:>4}  {}\n", cluster.label, cluster.members.join(", ")));
    }
    let noise = assignment.noise();
    if !noise.is_empty() {
        output.push_str(&format!("  noise {}\n", noise.join(", ")));
    }
    output
}

fn assignment_markdown(assignment: &ClusterAssignment) -> String {
    let mut output = String::from("| Cluster | Members |\n|---------|---------|\n");
    for cluster in assignment.clusters() {
        output.push_str(&format!("| {} | {} |\n", cluster.label, cluster.members.join(", ")));
    }
    let noise = assignment.noise();
    if !noise.is_empty() {
        output.push_str(&format!("| noise | {} |\n", noise.join(", ")));
    }
    output
}

fn emit(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            info!(path = %path.display(), "wrote output");
        }
        None => print!("{content}"),
    }
    Ok(())
}
