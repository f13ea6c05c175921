use polars::prelude::*;
use serde_json::{json, Value};
use std::fmt;

use crate::algorithms::aggregation::{class_distribution, fraud_amount_summary, fraud_ratio};
use crate::algorithms::correlation::pearson_correlation;
use crate::config::{FraudSettings, PipelineConfig};
use crate::core::domain::{COL_CARD_AMOUNT, COL_IS_FRAUD};
use crate::engine::{DataEngine, EngineSession, Table};
use crate::error::PipelineResult;
use crate::io::writers::PartitionManifest;
use crate::pipeline::frame_to_records;
use crate::transformations::{derive_fraud_features, normalize_card_transactions};

/// Results of one fraud analysis run.
#[derive(Debug, Clone)]
pub struct FraudReport {
    /// Tree rendering of the derived table's schema.
    pub schema: String,
    pub manifest: PartitionManifest,
    pub total_rows: usize,
    pub amount_summary: DataFrame,
    pub fraud_ratio: DataFrame,
    pub correlation: f64,
    pub class_distribution: DataFrame,
}

impl FraudReport {
    pub fn to_json(&self) -> PipelineResult<Value> {
        Ok(json!({
            "schema": self.schema,
            "partitions": self.manifest,
            "total_rows": self.total_rows,
            "amount_summary": frame_to_records(&self.amount_summary)?,
            "fraud_ratio": frame_to_records(&self.fraud_ratio)?,
            "correlation": self.correlation,
            "class_distribution": frame_to_records(&self.class_distribution)?,
        }))
    }
}

impl fmt::Display for FraudReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.schema)?;
        writeln!(
            f,
            "Wrote {} rows to {} partition(s) under {}",
            self.manifest.total_rows(),
            self.manifest.partitions.len(),
            self.manifest.root.display()
        )?;
        writeln!(f, "\n{}", self.amount_summary)?;
        writeln!(f, "\n{}", self.fraud_ratio)?;
        writeln!(f, "\nCorrelation between Amount and Fraud: {}", self.correlation)?;
        write!(f, "\nClass Distribution:\n{}", self.class_distribution)
    }
}

/// Render a schema as an indented tree, one field per line.
pub fn render_schema(schema: &Schema) -> String {
    let mut out = String::from("root");
    for (name, dtype) in schema.iter() {
        out.push_str(&format!("\n |-- {}: {} (nullable = true)", name, dtype));
    }
    out
}

/// Card fraud pipeline over any [`DataEngine`].
pub struct FraudPipeline<'a, E: DataEngine> {
    engine: &'a E,
    settings: FraudSettings,
}

impl<'a, E: DataEngine> FraudPipeline<'a, E> {
    pub fn new(engine: &'a E, settings: FraudSettings) -> Self {
        Self { engine, settings }
    }

    pub fn settings(&self) -> &FraudSettings {
        &self.settings
    }

    pub fn run(&self) -> PipelineResult<FraudReport> {
        let raw = self.engine.load_csv(&self.settings.input_path)?;
        self.run_table(&raw)
    }

    /// Run every stage after loading on an already loaded table.
    pub fn run_table(&self, raw: &Table) -> PipelineResult<FraudReport> {
        let normalized = normalize_card_transactions(raw, self.settings.drop_missing)?;
        let derived = derive_fraud_features(&normalized)?;
        let schema = render_schema(derived.schema()?.as_ref());

        let manifest = self.engine.write_partitioned(
            &derived,
            &self.settings.output_path,
            COL_IS_FRAUD,
            self.settings.write_mode,
        )?;
        log::info!(
            "Wrote {} partition(s) to {}",
            manifest.partitions.len(),
            manifest.root.display()
        );

        let partitioned = derived.repartition_by(COL_IS_FRAUD)?;

        let amount_summary =
            fraud_amount_summary(&partitioned, self.settings.aggregation_mode)?.collect()?;
        let total_rows = partitioned.count()?;
        let ratio = fraud_ratio(&partitioned, total_rows)?.collect()?;

        let frame = partitioned.collect()?;
        let correlation = pearson_correlation(&frame, COL_CARD_AMOUNT, COL_IS_FRAUD)?;
        let distribution = class_distribution(&partitioned)?.collect()?;

        Ok(FraudReport {
            schema,
            manifest,
            total_rows,
            amount_summary,
            fraud_ratio: ratio,
            correlation,
            class_distribution: distribution,
        })
    }
}

/// Start an engine session, run the fraud pipeline with `config`, and
/// release the session when the run ends.
pub fn run_fraud_pipeline(config: &PipelineConfig) -> PipelineResult<FraudReport> {
    let session = EngineSession::start(config.engine.clone());
    log::info!(
        "Running fraud pipeline on {} in session '{}'",
        config.fraud.input_path.display(),
        session.app_name()
    );
    FraudPipeline::new(&session, config.fraud.clone()).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::io::writers::WriteMode;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    /// Keeps the written tables in memory.
    #[derive(Default)]
    struct RecordingEngine {
        input: Option<DataFrame>,
        written: RefCell<Vec<(PathBuf, DataFrame)>>,
    }

    impl DataEngine for RecordingEngine {
        fn load_csv(&self, path: &Path) -> PipelineResult<Table> {
            self.input.clone().map(Table::from_frame).ok_or_else(|| {
                PipelineError::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no input"),
                )
            })
        }

        fn write_partitioned(
            &self,
            table: &Table,
            dest: &Path,
            key: &str,
            _mode: WriteMode,
        ) -> PipelineResult<PartitionManifest> {
            let df = table.collect()?;
            let rows = df.height();
            self.written.borrow_mut().push((dest.to_path_buf(), df));
            Ok(PartitionManifest {
                root: dest.to_path_buf(),
                key: key.to_string(),
                partitions: vec![crate::io::writers::PartitionInfo {
                    key_value: "all".to_string(),
                    path: dest.to_path_buf(),
                    rows,
                }],
            })
        }
    }

    fn engine() -> RecordingEngine {
        RecordingEngine {
            input: Some(
                df!(
                    "Time" => [0i64, 0, 5],
                    "Amount" => [10.0, 10.0, 50.0],
                    "Class" => [0i64, 0, 1],
                )
                .unwrap(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_through_engine_seam() {
        let engine = engine();
        let report = FraudPipeline::new(&engine, FraudSettings::default())
            .run()
            .unwrap();

        assert_eq!(report.total_rows, 2);
        assert!(report.schema.starts_with("root\n |-- Time"));
        assert!(report.schema.contains(" |-- isFraud: "));
        assert!(report.schema.contains(" |-- FraudLabel: "));

        let written = engine.written.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("output_path/partitioned_data"));
        assert_eq!(written[0].1.height(), 2);

        let pct = report.fraud_ratio.column("FraudPercentage").unwrap();
        let pct = pct.f64().unwrap();
        assert_eq!(pct.get(0), Some(50.0));
        assert_eq!(pct.get(1), Some(50.0));
        assert!((report.correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_input_surfaces_io_error() {
        let engine = RecordingEngine::default();
        let err = FraudPipeline::new(&engine, FraudSettings::default())
            .run()
            .unwrap_err();
        assert!(err.is_io());
        assert!(engine.written.borrow().is_empty());
    }

    #[test]
    fn test_render_schema() {
        let df = df!("Amount" => [1.0], "isFraud" => [0i64]).unwrap();
        assert_eq!(
            render_schema(df.schema()),
            "root\n |-- Amount: f64 (nullable = true)\n |-- isFraud: i64 (nullable = true)"
        );
    }
}
