use chrono::NaiveDateTime;
use polars::prelude::*;

use crate::core::domain::{
    step_to_timestamp, COL_AMOUNT, COL_AMOUNT_CONVERTED, COL_CARD_AMOUNT, COL_FRAUD_LABEL,
    COL_IS_FRAUD, COL_LOG_AMOUNT, COL_STEP, COL_TIMESTAMP, FRAUD_LABEL, NON_FRAUD_LABEL,
};
use crate::engine::Table;
use crate::error::{PipelineError, PipelineResult};
use crate::transformations::cleaning::require_columns;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// `amount * rate`, computed in floating point.
pub fn converted_amount_expr(rate: f64) -> Expr {
    (col(COL_AMOUNT).cast(DataType::Float64) * lit(rate)).alias(COL_AMOUNT_CONVERTED)
}

/// `epoch + step hours` as a millisecond datetime without time zone.
pub fn step_timestamp_expr(epoch: NaiveDateTime) -> Expr {
    let epoch_ms = epoch.and_utc().timestamp_millis();
    (col(COL_STEP).cast(DataType::Int64) * lit(MILLIS_PER_HOUR) + lit(epoch_ms))
        .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
        .alias(COL_TIMESTAMP)
}

/// Fail with `OutOfRange` when the smallest or largest `step` has no
/// representable timestamp for `epoch`.
fn check_step_range(df: &DataFrame, epoch: NaiveDateTime) -> PipelineResult<()> {
    let steps = df.column(COL_STEP)?.cast(&DataType::Int64)?;
    let steps = steps.i64()?;
    for value in [steps.min(), steps.max()].into_iter().flatten() {
        if step_to_timestamp(epoch, value).is_none() {
            return Err(PipelineError::OutOfRange {
                column: COL_STEP.to_string(),
                stage: "transform".to_string(),
                reason: format!("step {} has no timestamp from epoch {}", value, epoch),
            });
        }
    }
    Ok(())
}

/// Add `amount_converted` and `timestamp` to cleansed ledger rows.
///
/// # Errors
/// * `PipelineError::MissingColumn` if `amount` or `step` is absent
/// * `PipelineError::OutOfRange` if a `step` has no representable timestamp
pub fn transform_ledger(
    df: &DataFrame,
    conversion_rate: f64,
    epoch: NaiveDateTime,
) -> PipelineResult<DataFrame> {
    require_columns(df, &[COL_AMOUNT, COL_STEP], "transform")?;
    check_step_range(df, epoch)?;

    df.clone()
        .lazy()
        .with_columns([converted_amount_expr(conversion_rate), step_timestamp_expr(epoch)])
        .collect()
        .map_err(|e| PipelineError::in_stage(e, "transform"))
}

/// Add `LogTransactionAmt = ln(Amount + 1)` and the `FraudLabel` text.
pub fn derive_fraud_features(table: &Table) -> PipelineResult<Table> {
    table.require_column(COL_CARD_AMOUNT, "feature derivation")?;
    table.require_column(COL_IS_FRAUD, "feature derivation")?;

    Ok(table.with_columns(vec![
        col(COL_CARD_AMOUNT)
            .cast(DataType::Float64)
            .log1p()
            .alias(COL_LOG_AMOUNT),
        when(col(COL_IS_FRAUD).cast(DataType::Int64).eq(lit(1i64)))
            .then(lit(FRAUD_LABEL))
            .otherwise(lit(NON_FRAUD_LABEL))
            .alias(COL_FRAUD_LABEL),
    ]))
}
