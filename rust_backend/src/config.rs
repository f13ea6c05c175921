//! Pipeline configuration file support.
//!
//! Both pipelines read their settings from a single TOML file. Every field
//! has a default, so an absent file or an empty section is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::domain::{parse_epoch, DEFAULT_CONVERSION_RATE, DEFAULT_EPOCH};
use crate::engine::{AggregationMode, EngineSettings};
use crate::error::{PipelineError, PipelineResult};
use crate::io::writers::WriteMode;

/// File name searched for when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "pipelines.toml";

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub fraud: FraudSettings,
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Settings for the single-node ledger pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    #[serde(default = "default_ledger_input")]
    pub input_path: PathBuf,
    #[serde(default = "default_conversion_rate")]
    pub conversion_rate: f64,
    #[serde(default = "default_epoch")]
    pub epoch: String,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

/// Settings for the card fraud pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudSettings {
    #[serde(default = "default_fraud_input")]
    pub input_path: PathBuf,
    #[serde(default = "default_fraud_output")]
    pub output_path: PathBuf,
    #[serde(default)]
    pub aggregation_mode: AggregationMode,
    #[serde(default)]
    pub write_mode: WriteMode,
    #[serde(default = "default_drop_missing")]
    pub drop_missing: bool,
}

fn default_ledger_input() -> PathBuf {
    PathBuf::from("path_to_dataset.csv")
}

fn default_conversion_rate() -> f64 {
    DEFAULT_CONVERSION_RATE
}

fn default_epoch() -> String {
    DEFAULT_EPOCH.to_string()
}

fn default_histogram_bins() -> usize {
    50
}

fn default_fraud_input() -> PathBuf {
    PathBuf::from("creditcard.csv")
}

fn default_fraud_output() -> PathBuf {
    PathBuf::from("output_path/partitioned_data")
}

fn default_drop_missing() -> bool {
    true
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            input_path: default_ledger_input(),
            conversion_rate: default_conversion_rate(),
            epoch: default_epoch(),
            histogram_bins: default_histogram_bins(),
        }
    }
}

impl Default for FraudSettings {
    fn default() -> Self {
        Self {
            input_path: default_fraud_input(),
            output_path: default_fraud_output(),
            aggregation_mode: AggregationMode::default(),
            write_mode: WriteMode::default(),
            drop_missing: default_drop_missing(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(PipelineConfig)` if the file was read, parsed and validated
    /// * `Err(PipelineError::Configuration)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PipelineError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> PipelineResult<Self> {
        let config: PipelineConfig = toml::from_str(content).map_err(|e| {
            PipelineError::Configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Search the standard locations for `pipelines.toml`.
    ///
    /// Searches, in order:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    ///
    /// Returns `Ok(None)` when no file exists in any of them.
    pub fn from_default_location() -> PipelineResult<Option<Self>> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("rust_backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths.iter() {
            if path.exists() {
                log::debug!("Loading configuration from {}", path.display());
                return Self::from_file(path).map(Some);
            }
        }

        Ok(None)
    }

    /// Load from an explicit path, else the default locations, else defaults.
    pub fn load(explicit: Option<&Path>) -> PipelineResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Ok(Self::from_default_location()?.unwrap_or_default()),
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        let rate = self.ledger.conversion_rate;
        if !rate.is_finite() || rate < 0.0 {
            return Err(PipelineError::Configuration(format!(
                "ledger.conversion_rate must be a finite, non-negative number (got {})",
                rate
            )));
        }

        if self.ledger.histogram_bins == 0 {
            return Err(PipelineError::Configuration(
                "ledger.histogram_bins must be greater than zero".to_string(),
            ));
        }

        parse_epoch(&self.ledger.epoch)
            .map_err(|e| PipelineError::Configuration(format!("ledger.epoch: {}", e)))?;

        if self.engine.infer_schema_length == 0 {
            return Err(PipelineError::Configuration(
                "engine.infer_schema_length must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
