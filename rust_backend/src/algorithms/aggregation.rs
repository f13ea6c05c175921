use polars::prelude::*;

use crate::core::domain::{
    COL_AMOUNT, COL_AMOUNT_CONVERTED, COL_CARD_AMOUNT, COL_COUNT, COL_DAY, COL_FRAUD_PERCENTAGE,
    COL_IS_FRAUD, COL_MONTH, COL_TIMESTAMP, COL_WEEK,
};
use crate::engine::{AggRequest, AggregationMode, Statistic, Table};
use crate::error::{PipelineError, PipelineResult};
use crate::transformations::cleaning::require_columns;

/// Daily, ISO-weekly and monthly totals of the ledger amounts.
#[derive(Debug, Clone)]
pub struct PeriodSummaries {
    pub daily: DataFrame,
    pub weekly: DataFrame,
    pub monthly: DataFrame,
}

/// Add the `day` (date), `week` (`YYYY-Www`, ISO year and week) and `month`
/// (`YYYY-MM`) bucket keys derived from `timestamp`.
pub fn assign_calendar_buckets(df: &DataFrame) -> PipelineResult<DataFrame> {
    require_columns(df, &[COL_TIMESTAMP], "aggregate")?;

    df.clone()
        .lazy()
        .with_columns([
            col(COL_TIMESTAMP).cast(DataType::Date).alias(COL_DAY),
            col(COL_TIMESTAMP).dt().strftime("%G-W%V").alias(COL_WEEK),
            col(COL_TIMESTAMP).dt().strftime("%Y-%m").alias(COL_MONTH),
        ])
        .collect()
        .map_err(|e| PipelineError::in_stage(e, "aggregate"))
}

fn amount_sums() -> Vec<AggRequest> {
    vec![
        AggRequest::new(COL_AMOUNT, Statistic::Sum).with_alias(COL_AMOUNT),
        AggRequest::new(COL_AMOUNT_CONVERTED, Statistic::Sum).with_alias(COL_AMOUNT_CONVERTED),
    ]
}

/// Sum `amount` and `amount_converted` per day, week and month.
///
/// An empty input yields three empty summaries.
pub fn summarize_periods(df: &DataFrame) -> PipelineResult<PeriodSummaries> {
    require_columns(df, &[COL_AMOUNT, COL_AMOUNT_CONVERTED], "aggregate")?;
    let bucketed = Table::from_frame(assign_calendar_buckets(df)?);
    let requests = amount_sums();

    let summarize = |key: &str| -> PipelineResult<DataFrame> {
        bucketed
            .group_by_agg(&[key], &requests, AggregationMode::AllRequests)
            .collect()
    };

    let summaries = PeriodSummaries {
        daily: summarize(COL_DAY)?,
        weekly: summarize(COL_WEEK)?,
        monthly: summarize(COL_MONTH)?,
    };

    log::info!(
        "Aggregated {} days, {} weeks, {} months",
        summaries.daily.height(),
        summaries.weekly.height(),
        summaries.monthly.height()
    );

    Ok(summaries)
}

/// The amount statistics requested per fraud flag.
pub fn fraud_amount_requests() -> Vec<AggRequest> {
    vec![
        AggRequest::new(COL_CARD_AMOUNT, Statistic::Mean),
        AggRequest::new(COL_CARD_AMOUNT, Statistic::StdDev),
        AggRequest::new(COL_CARD_AMOUNT, Statistic::Max),
        AggRequest::new(COL_CARD_AMOUNT, Statistic::Min),
    ]
}

/// Mean, standard deviation, max and min of `Amount` per fraud flag.
///
/// Under `AggregationMode::LastPerColumn` only `min(Amount)` survives.
pub fn fraud_amount_summary(table: &Table, mode: AggregationMode) -> PipelineResult<Table> {
    table.require_column(COL_IS_FRAUD, "fraud summary")?;
    table.require_column(COL_CARD_AMOUNT, "fraud summary")?;
    Ok(table.group_by_agg(&[COL_IS_FRAUD], &fraud_amount_requests(), mode))
}

/// Rows per fraud flag with their share of `total` as a percentage.
pub fn fraud_ratio(table: &Table, total: usize) -> PipelineResult<Table> {
    let counts = class_distribution(table)?;
    Ok(counts.with_column(
        (col(COL_COUNT).cast(DataType::Float64) / lit(total as f64) * lit(100.0))
            .alias(COL_FRAUD_PERCENTAGE),
    ))
}

/// Rows per fraud flag.
pub fn class_distribution(table: &Table) -> PipelineResult<Table> {
    table.require_column(COL_IS_FRAUD, "fraud ratio")?;
    Ok(table.group_by_count(&[COL_IS_FRAUD]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::default_epoch;
    use crate::transformations::transform_ledger;

    fn transformed(amounts: &[f64], steps: &[i64]) -> DataFrame {
        let kinds: Vec<&str> = amounts.iter().map(|_| "PAYMENT").collect();
        let raw = df!(
            "type" => kinds,
            "amount" => amounts.to_vec(),
            "step" => steps.to_vec(),
        )
        .unwrap();
        transform_ledger(&raw, 1.1, default_epoch()).unwrap()
    }

    fn total(df: &DataFrame, column: &str) -> f64 {
        df.column(column).unwrap().f64().unwrap().sum().unwrap_or(0.0)
    }

    #[test]
    fn test_calendar_buckets() {
        let df = transformed(&[1.0, 2.0, 3.0], &[0, 24 * 3, 24 * 31]);
        let bucketed = assign_calendar_buckets(&df).unwrap();

        let days = bucketed.column(COL_DAY).unwrap().cast(&DataType::String).unwrap();
        assert_eq!(days.str().unwrap().get(0), Some("2021-01-01"));
        assert_eq!(days.str().unwrap().get(2), Some("2021-02-01"));

        // 2021-01-01 is a Friday in ISO week 53 of 2020; 2021-01-04 opens week 1.
        let weeks = bucketed.column(COL_WEEK).unwrap().str().unwrap();
        assert_eq!(weeks.get(0), Some("2020-W53"));
        assert_eq!(weeks.get(1), Some("2021-W01"));

        let months = bucketed.column(COL_MONTH).unwrap().str().unwrap();
        assert_eq!(months.get(0), Some("2021-01"));
        assert_eq!(months.get(2), Some("2021-02"));
    }

    #[test]
    fn test_daily_summary_sums_per_day() {
        let df = transformed(&[100.0, 50.0, 25.0], &[0, 5, 30]);
        let summaries = summarize_periods(&df).unwrap();

        assert_eq!(summaries.daily.height(), 2);
        let amounts = summaries.daily.column(COL_AMOUNT).unwrap().f64().unwrap();
        assert_eq!(amounts.get(0), Some(150.0));
        assert_eq!(amounts.get(1), Some(25.0));

        let converted = summaries
            .daily
            .column(COL_AMOUNT_CONVERTED)
            .unwrap()
            .f64()
            .unwrap();
        assert!((converted.get(0).unwrap() - 165.0).abs() < 1e-9);
    }

    #[test]
    fn test_summaries_reconcile() {
        let df = transformed(&[10.0, 20.5, 30.25, 7.0], &[0, 200, 900, 2000]);
        let summaries = summarize_periods(&df).unwrap();

        let expected = total(&df, COL_AMOUNT);
        assert!((total(&summaries.daily, COL_AMOUNT) - expected).abs() < 1e-9);
        assert!((total(&summaries.weekly, COL_AMOUNT) - expected).abs() < 1e-9);
        assert!((total(&summaries.monthly, COL_AMOUNT) - expected).abs() < 1e-9);
        assert_eq!(summaries.monthly.height(), 3);
    }

    #[test]
    fn test_empty_input_gives_empty_summaries() {
        let df = transformed(&[], &[]);
        let summaries = summarize_periods(&df).unwrap();
        assert_eq!(summaries.daily.height(), 0);
        assert_eq!(summaries.weekly.height(), 0);
        assert_eq!(summaries.monthly.height(), 0);
    }

    fn card_table() -> Table {
        Table::from_frame(
            df!(
                "Amount" => [10.0, 30.0, 50.0, 70.0],
                "isFraud" => [0i64, 0, 1, 1],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_fraud_summary_all_statistics() {
        let df = fraud_amount_summary(&card_table(), AggregationMode::AllRequests)
            .unwrap()
            .collect()
            .unwrap();

        assert_eq!(df.width(), 5);
        let mean = df.column("avg(Amount)").unwrap().f64().unwrap();
        assert_eq!(mean.get(0), Some(20.0));
        assert_eq!(mean.get(1), Some(60.0));
        let std = df.column("stddev(Amount)").unwrap().f64().unwrap();
        assert!((std.get(0).unwrap() - 200f64.sqrt()).abs() < 1e-9);
        let max = df.column("max(Amount)").unwrap().f64().unwrap();
        assert_eq!(max.get(1), Some(70.0));
        let min = df.column("min(Amount)").unwrap().f64().unwrap();
        assert_eq!(min.get(1), Some(50.0));
    }

    #[test]
    fn test_fraud_summary_collapsed_to_last_statistic() {
        let df = fraud_amount_summary(&card_table(), AggregationMode::LastPerColumn)
            .unwrap()
            .collect()
            .unwrap();

        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["isFraud", "min(Amount)"]);
        let min = df.column("min(Amount)").unwrap().f64().unwrap();
        assert_eq!(min.get(0), Some(10.0));
    }

    #[test]
    fn test_fraud_ratio_percentages() {
        let table = card_table();
        let df = fraud_ratio(&table, 4).unwrap().collect().unwrap();
        let pct = df.column(COL_FRAUD_PERCENTAGE).unwrap().f64().unwrap();
        assert_eq!(pct.get(0), Some(50.0));
        assert_eq!(pct.get(1), Some(50.0));
    }

    #[test]
    fn test_fraud_ratio_requires_flag() {
        let table = Table::from_frame(df!("Amount" => [1.0]).unwrap());
        assert!(fraud_ratio(&table, 1).is_err());
    }
}
