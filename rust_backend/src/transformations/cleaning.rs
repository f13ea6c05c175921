use polars::prelude::*;

use crate::core::domain::{
    TransactionType, COL_AMOUNT, COL_CARD_AMOUNT, COL_CLASS, COL_IS_FRAUD, COL_STEP, COL_TYPE,
};
use crate::engine::Table;
use crate::error::{PipelineError, PipelineResult};

/// Fail with `MissingColumn` for the first of `required` absent from `df`.
pub fn require_columns(df: &DataFrame, required: &[&str], stage: &str) -> PipelineResult<()> {
    for name in required {
        if df.column(name).is_err() {
            return Err(PipelineError::missing_column(*name, stage));
        }
    }
    Ok(())
}

/// Predicate true when `type` is one of the accepted transaction types.
pub fn valid_type_predicate() -> Expr {
    TransactionType::ALL
        .iter()
        .map(|kind| col(COL_TYPE).eq(lit(kind.as_str())))
        .reduce(|acc, next| acc.or(next))
        .unwrap_or_else(|| lit(false))
}

/// Casts of the ledger columns to their declared types.
///
/// A header-only file infers every column as `String`, and a text value that
/// does not parse as the declared type fails the stage.
fn declared_ledger_types(df: &DataFrame) -> Vec<Expr> {
    let mut casts = vec![
        col(COL_TYPE).strict_cast(DataType::String),
        col(COL_AMOUNT).strict_cast(DataType::Float64),
    ];
    if df.column(COL_STEP).is_ok() {
        casts.push(col(COL_STEP).strict_cast(DataType::Int64));
    }
    casts
}

/// Cleanse raw ledger rows.
///
/// `type`, `amount` and `step` are first cast to text, float and integer.
/// Applied in order: drop exact duplicate rows (first occurrence kept), drop
/// rows with any missing field, keep rows whose `type` is valid, keep rows
/// with `amount > 0`. Dropped rows are not counted.
pub fn cleanse_ledger(df: &DataFrame) -> PipelineResult<DataFrame> {
    require_columns(df, &[COL_TYPE, COL_AMOUNT], "cleanse")?;

    let cleaned = df
        .clone()
        .lazy()
        .with_columns(declared_ledger_types(df))
        .unique_stable(None, UniqueKeepStrategy::First)
        .drop_nulls(None)
        .filter(valid_type_predicate())
        .filter(col(COL_AMOUNT).gt(lit(0.0)))
        .collect()
        .map_err(|e| PipelineError::in_stage(e, "cleanse"))?;

    log::info!(
        "Cleansed ledger: {} of {} rows kept",
        cleaned.height(),
        df.height()
    );

    Ok(cleaned)
}

/// Rename the card label column to `isFraud`, cast `isFraud` and `Amount`
/// to integer and float, and drop duplicate rows.
///
/// With `drop_missing` rows holding any null are removed as well.
pub fn normalize_card_transactions(table: &Table, drop_missing: bool) -> PipelineResult<Table> {
    let renamed = table.rename(COL_CLASS, COL_IS_FRAUD)?;
    renamed.require_column(COL_CARD_AMOUNT, "normalize")?;
    let typed = renamed.with_columns(vec![
        col(COL_IS_FRAUD).strict_cast(DataType::Int64),
        col(COL_CARD_AMOUNT).strict_cast(DataType::Float64),
    ]);
    let deduplicated = typed.drop_duplicates();
    if drop_missing {
        Ok(deduplicated.drop_nulls())
    } else {
        Ok(deduplicated)
    }
}
