use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Number of rows scanned for type inference when none is configured.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// Reads a headered, comma-delimited file into a DataFrame with inferred
/// column types.
#[derive(Debug, Clone, Copy)]
pub struct CsvLoader {
    infer_schema_length: usize,
}

impl CsvLoader {
    pub fn new(infer_schema_length: usize) -> Self {
        Self {
            infer_schema_length: infer_schema_length.max(1),
        }
    }

    pub fn infer_schema_length(&self) -> usize {
        self.infer_schema_length
    }

    /// Load a CSV file.
    ///
    /// # Errors
    /// * `PipelineError::Io` if the path cannot be opened or is a directory
    /// * `PipelineError::Malformed` if the content is not a parseable table
    pub fn load(&self, path: &Path) -> PipelineResult<DataFrame> {
        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::io(path, e))?;
        if metadata.is_dir() {
            return Err(PipelineError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path is a directory"),
            ));
        }

        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PipelineError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        log::info!(
            "Extracted {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );

        Ok(df)
    }
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_INFER_SCHEMA_LENGTH)
    }
}
