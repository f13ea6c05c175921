use chrono::NaiveDateTime;
use polars::prelude::*;
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;

use crate::algorithms::aggregation::{summarize_periods, PeriodSummaries};
use crate::config::{LedgerSettings, PipelineConfig};
use crate::core::domain::{parse_epoch, COL_AMOUNT};
use crate::engine::EngineSettings;
use crate::error::{PipelineError, PipelineResult};
use crate::io::loaders::CsvLoader;
use crate::pipeline::frame_to_records;
use crate::services::quality::{check_quality, QualityReport};
use crate::services::statistics::{column_histogram, describe, DescriptiveStatistics, HistogramBin};
use crate::transformations::{cleanse_ledger, transform_ledger};

/// Everything one ledger run produces.
#[derive(Debug, Clone)]
pub struct LedgerReport {
    pub rows_extracted: usize,
    pub rows_cleansed: usize,
    pub quality: QualityReport,
    pub statistics: DescriptiveStatistics,
    pub amount_distribution: Vec<HistogramBin>,
    pub summaries: PeriodSummaries,
}

impl LedgerReport {
    pub fn to_json(&self) -> PipelineResult<Value> {
        Ok(json!({
            "rows_extracted": self.rows_extracted,
            "rows_cleansed": self.rows_cleansed,
            "data_quality_issues": self.quality,
            "summary_statistics": self.statistics,
            "amount_distribution": self.amount_distribution,
            "daily_summary": frame_to_records(&self.summaries.daily)?,
            "weekly_summary": frame_to_records(&self.summaries.weekly)?,
            "monthly_summary": frame_to_records(&self.summaries.monthly)?,
        }))
    }
}

impl fmt::Display for LedgerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data Quality Issues: {}", self.quality)?;

        writeln!(f, "\nSummary Statistics:")?;
        match self.statistics.to_frame() {
            Ok(frame) => writeln!(f, "{}", frame)?,
            Err(e) => writeln!(f, "<unavailable: {}>", e)?,
        }

        writeln!(f, "\nTransaction Amount Distribution:")?;
        for bin in &self.amount_distribution {
            writeln!(f, "  [{:>14.2}, {:>14.2}]  {}", bin.lower, bin.upper, bin.count)?;
        }

        writeln!(f, "\nDaily Summary:\n{}", self.summaries.daily)?;
        writeln!(f, "\nWeekly Summary:\n{}", self.summaries.weekly)?;
        write!(f, "\nMonthly Summary:\n{}", self.summaries.monthly)
    }
}

/// Single-node ledger pipeline.
pub struct LedgerPipeline {
    settings: LedgerSettings,
    epoch: NaiveDateTime,
    loader: CsvLoader,
}

impl LedgerPipeline {
    pub fn new(settings: LedgerSettings, engine: &EngineSettings) -> PipelineResult<Self> {
        let epoch = parse_epoch(&settings.epoch).map_err(PipelineError::Configuration)?;
        Ok(Self {
            settings,
            epoch,
            loader: CsvLoader::new(engine.infer_schema_length),
        })
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Run against the configured input file.
    pub fn run(&self) -> PipelineResult<LedgerReport> {
        self.run_file(&self.settings.input_path)
    }

    pub fn run_file(&self, path: &Path) -> PipelineResult<LedgerReport> {
        let raw = self.loader.load(path)?;
        self.run_frame(&raw)
    }

    /// Run every stage after extraction on an in-memory table.
    pub fn run_frame(&self, raw: &DataFrame) -> PipelineResult<LedgerReport> {
        let cleansed = cleanse_ledger(raw)?;
        let transformed = transform_ledger(&cleansed, self.settings.conversion_rate, self.epoch)?;
        let summaries = summarize_periods(&transformed)?;
        let quality = check_quality(&transformed)?;
        let statistics = describe(&transformed)?;
        let amount_distribution =
            column_histogram(&transformed, COL_AMOUNT, self.settings.histogram_bins)?;

        Ok(LedgerReport {
            rows_extracted: raw.height(),
            rows_cleansed: cleansed.height(),
            quality,
            statistics,
            amount_distribution,
            summaries,
        })
    }
}

/// Build a ledger pipeline from `config` and run it on its input file.
pub fn run_ledger_pipeline(config: &PipelineConfig) -> PipelineResult<LedgerReport> {
    log::info!(
        "Running ledger pipeline on {}",
        config.ledger.input_path.display()
    );
    LedgerPipeline::new(config.ledger.clone(), &config.engine)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{COL_AMOUNT_CONVERTED, COL_DAY};

    fn pipeline() -> LedgerPipeline {
        LedgerPipeline::new(LedgerSettings::default(), &EngineSettings::default()).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let raw = df!(
            "type" => ["PAYMENT", "TRANSFER", "PAYMENT"],
            "amount" => [100.0, -5.0, 100.0],
            "step" => [0i64, 1, 0],
        )
        .unwrap();

        let report = pipeline().run_frame(&raw).unwrap();
        assert_eq!(report.rows_extracted, 3);
        assert_eq!(report.rows_cleansed, 1);
        assert!(report.quality.is_empty());

        let stats = report.statistics.column(COL_AMOUNT_CONVERTED).unwrap();
        assert!((stats.mean.unwrap() - 110.0).abs() < 1e-9);

        let daily = &report.summaries.daily;
        assert_eq!(daily.height(), 1);
        let day = daily.column(COL_DAY).unwrap().cast(&DataType::String).unwrap();
        assert_eq!(day.str().unwrap().get(0), Some("2021-01-01"));
        let amount = daily.column(COL_AMOUNT).unwrap().f64().unwrap();
        assert_eq!(amount.get(0), Some(100.0));

        assert_eq!(report.amount_distribution.len(), 1);
        assert_eq!(report.amount_distribution[0].count, 1);
    }

    #[test]
    fn test_report_json_shape() {
        let raw = df!(
            "type" => ["PAYMENT", "DEBIT"],
            "amount" => [10.0, 20.0],
            "step" => [0i64, 48],
        )
        .unwrap();
        let json = pipeline().run_frame(&raw).unwrap().to_json().unwrap();

        assert_eq!(json["rows_cleansed"], 2);
        assert_eq!(json["daily_summary"].as_array().unwrap().len(), 2);
        assert_eq!(json["daily_summary"][1]["day"], "2021-01-03");
        assert_eq!(json["monthly_summary"][0]["amount"], 30.0);
        assert!(json["data_quality_issues"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_epoch_is_configuration_error() {
        let settings = LedgerSettings {
            epoch: "not a date".to_string(),
            ..LedgerSettings::default()
        };
        assert!(matches!(
            LedgerPipeline::new(settings, &EngineSettings::default()),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_step_fails_in_transform() {
        let raw = df!("type" => ["PAYMENT"], "amount" => [1.0]).unwrap();
        match pipeline().run_frame(&raw) {
            Err(PipelineError::MissingColumn { column, stage }) => {
                assert_eq!(column, "step");
                assert_eq!(stage, "transform");
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.rows_cleansed)),
        }
    }
}
