//! Ledger ETL binary.
//!
//! Runs extract, cleanse, transform, aggregate and quality checks over a
//! transaction ledger CSV and prints the report.
//!
//! # Usage
//!
//! ```bash
//! ledger-etl --input data/paysim.csv --rate 0.92
//! ledger-etl --config pipelines.toml --format json
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter, overrides `--verbose`

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use txn_etl::pipeline::run_ledger_pipeline;
use txn_etl::{PipelineConfig, VERSION};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "ledger-etl", version = VERSION, about = "Cleanse and summarize a transaction ledger")]
struct Cli {
    /// Configuration file (default: search for pipelines.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ledger CSV to process
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Currency conversion rate applied to `amount`
    #[arg(short, long)]
    rate: Option<f64>,

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
        config.ledger.input_path = input;
    }
    if let Some(rate) = cli.rate {
        config.ledger.conversion_rate = rate;
    }
    config.validate().context("Invalid configuration")?;

    let report = run_ledger_pipeline(&config).with_context(|| {
        format!(
            "Ledger pipeline failed for {}",
            config.ledger.input_path.display()
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
