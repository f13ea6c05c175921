//! Dataframe engine facade for the card fraud pipeline.
//!
//! The pipeline talks to the engine only through [`DataEngine`] and the
//! immutable [`Table`] handle. [`EngineSession`] is the polars-backed
//! implementation; it lives for one pipeline run and logs its release when
//! dropped.
//!
//! # Example
//!
//! ```no_run
//! use txn_etl::engine::{DataEngine, EngineSession, EngineSettings};
//! use polars::prelude::*;
//! use std::path::Path;
//!
//! # fn example() -> txn_etl::PipelineResult<()> {
//! let session = EngineSession::start(EngineSettings::default());
//! let table = session.load_csv(Path::new("creditcard.csv"))?;
//! let large = table.filter(col("Amount").gt(lit(1000.0)));
//! println!("{} large transactions", large.count()?);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod table;

pub use aggregate::{AggRequest, AggregationMode, Statistic};
pub use table::Table;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PipelineResult;
use crate::io::loaders::{CsvLoader, DEFAULT_INFER_SCHEMA_LENGTH};
use crate::io::writers::{write_partitioned_parquet, PartitionManifest, WriteMode};

/// Engine settings from the `[engine]` configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_infer_schema_length")]
    pub infer_schema_length: usize,
}

fn default_app_name() -> String {
    "Credit Card Fraud Detection".to_string()
}

fn default_infer_schema_length() -> usize {
    DEFAULT_INFER_SCHEMA_LENGTH
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            infer_schema_length: default_infer_schema_length(),
        }
    }
}

/// Operations that touch storage.
pub trait DataEngine {
    /// Load a headered CSV file as a logical table.
    fn load_csv(&self, path: &Path) -> PipelineResult<Table>;

    /// Execute `table` and persist it partitioned by `key`.
    fn write_partitioned(
        &self,
        table: &Table,
        dest: &Path,
        key: &str,
        mode: WriteMode,
    ) -> PipelineResult<PartitionManifest>;
}

/// Polars-backed engine scoped to one pipeline run.
pub struct EngineSession {
    settings: EngineSettings,
    loader: CsvLoader,
}

impl EngineSession {
    pub fn start(settings: EngineSettings) -> Self {
        log::info!("Starting engine session '{}'", settings.app_name);
        let loader = CsvLoader::new(settings.infer_schema_length);
        Self { settings, loader }
    }

    pub fn app_name(&self) -> &str {
        &self.settings.app_name
    }
}

impl DataEngine for EngineSession {
    fn load_csv(&self, path: &Path) -> PipelineResult<Table> {
        let df = self.loader.load(path)?;
        Ok(Table::from_frame(df))
    }

    fn write_partitioned(
        &self,
        table: &Table,
        dest: &Path,
        key: &str,
        mode: WriteMode,
    ) -> PipelineResult<PartitionManifest> {
        let df = table.collect()?;
        write_partitioned_parquet(&df, dest, key, mode)
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        log::info!("Engine session '{}' released", self.settings.app_name);
    }
}
