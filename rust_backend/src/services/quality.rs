//! Data quality checks for ledger tables.
//!
//! The checks only read the table. Their findings are reported next to the
//! pipeline output and never abort a run.
//!
//! The ledger pipeline runs them on cleansed data, where negative amounts and
//! invalid types have already been filtered out, so in that position only the
//! missing-value check can fire.

use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::domain::{COL_AMOUNT, COL_TYPE};
use crate::error::{PipelineError, PipelineResult};
use crate::transformations::cleaning::{require_columns, valid_type_predicate};

pub const ISSUE_NEGATIVE_AMOUNTS: &str = "Negative Amounts";
pub const ISSUE_INVALID_TYPES: &str = "Invalid Transaction Types";
pub const ISSUE_MISSING_VALUES: &str = "Missing Values";

/// Size of one finding: a row count, or a count per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QualityFinding {
    Count(usize),
    PerColumn(BTreeMap<String, usize>),
}

impl fmt::Display for QualityFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityFinding::Count(n) => write!(f, "{}", n),
            QualityFinding::PerColumn(counts) => {
                for (column, n) in counts {
                    write!(f, "\n  {:<24} {}", column, n)?;
                }
                Ok(())
            }
        }
    }
}

/// Issue label to finding. Only issues with a nonzero finding are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QualityReport {
    issues: BTreeMap<String, QualityFinding>,
}

impl QualityReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: &str, finding: QualityFinding) {
        self.issues.insert(issue.to_string(), finding);
    }

    pub fn get(&self, issue: &str) -> Option<&QualityFinding> {
        self.issues.get(issue)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QualityFinding)> {
        self.issues.iter()
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "none");
        }
        for (issue, finding) in &self.issues {
            writeln!(f, "{}: {}", issue, finding)?;
        }
        Ok(())
    }
}

fn scalar(df: &DataFrame, name: &str) -> PipelineResult<usize> {
    let value = df.column(name)?.cast(&DataType::UInt64)?;
    Ok(value.u64()?.get(0).unwrap_or(0) as usize)
}

/// Count negative amounts, types outside the valid set (a missing type
/// counts as invalid), and missing values per column.
pub fn check_quality(df: &DataFrame) -> PipelineResult<QualityReport> {
    require_columns(df, &[COL_AMOUNT, COL_TYPE], "quality check")?;

    let counts = df
        .clone()
        .lazy()
        .select([
            col(COL_AMOUNT)
                .cast(DataType::Float64)
                .lt(lit(0.0))
                .sum()
                .alias("negative"),
            valid_type_predicate()
                .fill_null(lit(false))
                .not()
                .sum()
                .alias("invalid"),
        ])
        .collect()
        .map_err(|e| PipelineError::in_stage(e, "quality check"))?;

    let mut report = QualityReport::new();

    let negative = scalar(&counts, "negative")?;
    if negative > 0 {
        report.add(ISSUE_NEGATIVE_AMOUNTS, QualityFinding::Count(negative));
    }

    let invalid = scalar(&counts, "invalid")?;
    if invalid > 0 {
        report.add(ISSUE_INVALID_TYPES, QualityFinding::Count(invalid));
    }

    let missing: BTreeMap<String, usize> = df
        .get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect();
    if missing.values().any(|n| *n > 0) {
        report.add(ISSUE_MISSING_VALUES, QualityFinding::PerColumn(missing));
    }

    if report.is_empty() {
        log::info!("Quality check found no issues in {} rows", df.height());
    } else {
        log::warn!("Quality check found {} issue(s)", report.len());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_table_has_no_issues() {
        let df = df!(
            "type" => ["PAYMENT", "CASH-IN"],
            "amount" => [1.0, 2.0],
        )
        .unwrap();
        let report = check_quality(&df).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "none");
    }

    #[test]
    fn test_reports_each_issue() {
        let df = df!(
            "type" => [Some("PAYMENT"), Some("REFUND"), None, Some("DEBIT")],
            "amount" => [Some(-1.0), Some(2.0), Some(-3.0), None],
        )
        .unwrap();
        let report = check_quality(&df).unwrap();

        assert_eq!(report.len(), 3);
        assert_eq!(
            report.get(ISSUE_NEGATIVE_AMOUNTS),
            Some(&QualityFinding::Count(2))
        );
        assert_eq!(report.get(ISSUE_INVALID_TYPES), Some(&QualityFinding::Count(2)));

        match report.get(ISSUE_MISSING_VALUES) {
            Some(QualityFinding::PerColumn(counts)) => {
                assert_eq!(counts.get("type"), Some(&1));
                assert_eq!(counts.get("amount"), Some(&1));
            }
            other => panic!("unexpected finding: {:?}", other),
        }
    }

    #[test]
    fn test_report_serializes_as_mapping() {
        let df = df!(
            "type" => ["PAYMENT", "REFUND"],
            "amount" => [-1.0, 2.0],
        )
        .unwrap();
        let report = check_quality(&df).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["Negative Amounts"], 1);
        assert_eq!(json["Invalid Transaction Types"], 1);
        assert!(json.get("Missing Values").is_none());
    }

    #[test]
    fn test_empty_table_has_no_issues() {
        let df = df!(
            "type" => Vec::<&str>::new(),
            "amount" => Vec::<f64>::new(),
        )
        .unwrap();
        assert!(check_quality(&df).unwrap().is_empty());
    }

    #[test]
    fn test_header_only_text_table_has_no_issues() {
        let df = df!(
            "type" => Vec::<&str>::new(),
            "amount" => Vec::<&str>::new(),
        )
        .unwrap();
        assert!(check_quality(&df).unwrap().is_empty());
    }

    #[test]
    fn test_requires_amount_column() {
        let df = df!("type" => ["PAYMENT"]).unwrap();
        assert!(matches!(
            check_quality(&df),
            Err(PipelineError::MissingColumn { .. })
        ));
    }
}
