//! Batch ETL for transaction ledgers and card fraud datasets.
//!
//! Two pipelines share the crate:
//!
//! - the ledger pipeline ([`pipeline::ledger`]) cleanses a PaySim-style
//!   ledger, converts amounts, derives timestamps from hour steps and
//!   reports quality findings, descriptive statistics and calendar totals
//! - the fraud pipeline ([`pipeline::fraud`]) normalizes a labelled card
//!   dataset, derives features, writes Hive-partitioned Parquet and
//!   summarizes amounts and class balance through the [`engine`] facade
//!
//! Both are configured from `pipelines.toml` (see [`config`]).

pub mod algorithms;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod services;
pub mod transformations;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};

/// Crate version, reported by the binaries.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
