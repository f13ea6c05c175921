//! Error types for pipeline operations.

use std::path::PathBuf;

use polars::prelude::PolarsError;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type for pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed input {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Missing column '{column}' in stage {stage}")]
    MissingColumn { column: String, stage: String },

    #[error("Value out of range in column '{column}' in stage {stage}: {reason}")]
    OutOfRange {
        column: String,
        stage: String,
        reason: String,
    },

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Engine error: {0}")]
    Engine(PolarsError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn missing_column(column: impl Into<String>, stage: impl Into<String>) -> Self {
        PipelineError::MissingColumn {
            column: column.into(),
            stage: stage.into(),
        }
    }

    /// True for failures reading the input or writing the destination.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            PipelineError::Io { .. }
                | PipelineError::Malformed { .. }
                | PipelineError::DestinationExists(_)
        )
    }

    /// Re-tag an engine error raised while running `stage`.
    ///
    /// Polars reports an absent column as `ColumnNotFound` only when the plan
    /// executes, so the stage name is attached here rather than at the call
    /// site that built the expression.
    pub fn in_stage(err: PolarsError, stage: &str) -> Self {
        match err {
            PolarsError::ColumnNotFound(msg) => PipelineError::MissingColumn {
                column: msg.to_string(),
                stage: stage.to_string(),
            },
            other => PipelineError::Engine(other),
        }
    }
}

impl From<PolarsError> for PipelineError {
    fn from(err: PolarsError) -> Self {
        PipelineError::in_stage(err, "engine")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_not_found_maps_to_missing_column() {
        let err = PipelineError::in_stage(
            PolarsError::ColumnNotFound("amount".into()),
            "cleanse",
        );
        match err {
            PipelineError::MissingColumn { column, stage } => {
                assert!(column.contains("amount"));
                assert_eq!(stage, "cleanse");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_io_classification() {
        let io = PipelineError::io(
            "missing.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "nope"),
        );
        assert!(io.is_io());
        assert!(PipelineError::DestinationExists(PathBuf::from("out")).is_io());
        assert!(!PipelineError::missing_column("type", "cleanse").is_io());
        assert!(!PipelineError::Configuration("bad".into()).is_io());
    }
}
