//! Card fraud analysis binary.
//!
//! Loads a labelled card transaction CSV, writes it partitioned by `isFraud`
//! and prints amount statistics, class balance and the amount/fraud
//! correlation.
//!
//! # Usage
//!
//! ```bash
//! fraud-analysis --input creditcard.csv --output out/partitioned --overwrite
//! fraud-analysis --mode last-per-column --format json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use txn_etl::engine::AggregationMode;
use txn_etl::io::WriteMode;
use txn_etl::pipeline::run_fraud_pipeline;
use txn_etl::{PipelineConfig, VERSION};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Every requested statistic
    AllRequests,
    /// Only the last statistic per column
    LastPerColumn,
}

impl From<ModeArg> for AggregationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::AllRequests => AggregationMode::AllRequests,
            ModeArg::LastPerColumn => AggregationMode::LastPerColumn,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "fraud-analysis", version = VERSION, about = "Partition and summarize card fraud data")]
struct Cli {
    /// Configuration file (default: search for pipelines.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Card transaction CSV with `Amount` and `Class` columns
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Destination directory for the partitioned Parquet output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Aggregation mode for the amount summary
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Replace an existing destination
    #[arg(long)]
    overwrite: bool,

    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config =
        PipelineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(input) = cli.input {
        config.fraud.input_path = input;
    }
    if let Some(output) = cli.output {
        config.fraud.output_path = output;
    }
    if let Some(mode) = cli.mode {
        config.fraud.aggregation_mode = mode.into();
    }
    if cli.overwrite {
        config.fraud.write_mode = WriteMode::Overwrite;
    }

    let report = run_fraud_pipeline(&config).with_context(|| {
        format!(
            "Fraud pipeline failed for {}",
            config.fraud.input_path.display()
        )
    })?;

    match cli.format {
        OutputFormat::Text => println!("{}", report),
        OutputFormat::Json => {
            let json = report.to_json()?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}
