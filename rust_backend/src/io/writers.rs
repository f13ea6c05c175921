//! Partitioned Parquet output.
//!
//! Tables are split by the value of one key column and each group is written
//! to `<dest>/<key>=<value>/part-00000.parquet`. The key column itself is not
//! stored in the files; readers recover it from the directory name.
//!
//! Partitions are written one after another with no rollback, so a failure
//! part-way through leaves the partitions written so far on disk.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

/// Directory value used for rows whose key is null.
pub const NULL_PARTITION_VALUE: &str = "__HIVE_DEFAULT_PARTITION__";

const PART_FILE_NAME: &str = "part-00000.parquet";

/// Behaviour when the destination directory already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    #[default]
    ErrorIfExists,
    Overwrite,
}

/// One written partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionInfo {
    pub key_value: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Everything a partitioned write produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PartitionManifest {
    pub root: PathBuf,
    pub key: String,
    pub partitions: Vec<PartitionInfo>,
}

impl PartitionManifest {
    pub fn total_rows(&self) -> usize {
        self.partitions.iter().map(|p| p.rows).sum()
    }

    pub fn partition(&self, key_value: &str) -> Option<&PartitionInfo> {
        self.partitions.iter().find(|p| p.key_value == key_value)
    }
}

/// Write `df` under `dest`, one sub-directory per distinct value of `key`.
///
/// # Errors
/// * `PipelineError::MissingColumn` if `key` is not a column of `df`
/// * `PipelineError::DestinationExists` in `ErrorIfExists` mode when `dest` exists
/// * `PipelineError::Io` if a directory or file cannot be created
pub fn write_partitioned_parquet(
    df: &DataFrame,
    dest: &Path,
    key: &str,
    mode: WriteMode,
) -> PipelineResult<PartitionManifest> {
    if df.column(key).is_err() {
        return Err(PipelineError::missing_column(key, "partitioned write"));
    }

    prepare_destination(dest, mode)?;

    if df.height() == 0 {
        log::info!("No rows to write under {}", dest.display());
        return Ok(PartitionManifest {
            root: dest.to_path_buf(),
            key: key.to_string(),
            partitions: Vec::new(),
        });
    }

    let groups = df
        .partition_by_stable([key], true)
        .map_err(|e| PipelineError::in_stage(e, "partitioned write"))?;

    let mut manifest = PartitionManifest {
        root: dest.to_path_buf(),
        key: key.to_string(),
        partitions: Vec::with_capacity(groups.len()),
    };

    for group in groups {
        let key_value = partition_value(&group, key)?;
        let dir = dest.join(format!("{}={}", key, key_value));
        fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;

        let mut data = group.drop(key)?;
        let path = dir.join(PART_FILE_NAME);
        let mut file = File::create(&path).map_err(|e| PipelineError::io(&path, e))?;
        ParquetWriter::new(&mut file)
            .finish(&mut data)
            .map_err(|e| PipelineError::in_stage(e, "partitioned write"))?;

        log::debug!("Wrote {} rows to {}", data.height(), path.display());

        manifest.partitions.push(PartitionInfo {
            key_value,
            path,
            rows: data.height(),
        });
    }

    log::info!(
        "Wrote {} rows in {} partitions under {}",
        manifest.total_rows(),
        manifest.partitions.len(),
        dest.display()
    );

    Ok(manifest)
}

fn prepare_destination(dest: &Path, mode: WriteMode) -> PipelineResult<()> {
    if dest.exists() {
        match mode {
            WriteMode::ErrorIfExists => {
                return Err(PipelineError::DestinationExists(dest.to_path_buf()));
            }
            WriteMode::Overwrite => {
                log::info!("Overwriting existing output at {}", dest.display());
                fs::remove_dir_all(dest).map_err(|e| PipelineError::io(dest, e))?;
            }
        }
    }

    fs::create_dir_all(dest).map_err(|e| PipelineError::io(dest, e))
}

/// Directory-name rendering of the key in a single-valued group.
fn partition_value(group: &DataFrame, key: &str) -> PipelineResult<String> {
    let as_text = group.column(key)?.cast(&DataType::String)?;
    let value = as_text.str()?.get(0).map(|s| s.to_string());
    Ok(value.unwrap_or_else(|| NULL_PARTITION_VALUE.to_string()))
}

/// Read one partition file back into memory.
pub fn read_partition(path: &Path) -> PipelineResult<DataFrame> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    ParquetReader::new(file)
        .finish()
        .map_err(|e| PipelineError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
