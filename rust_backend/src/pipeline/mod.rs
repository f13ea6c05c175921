//! End-to-end pipeline runners.
//!
//! - [`ledger`]: extract, cleanse, transform, aggregate, check and report a
//!   transaction ledger in memory
//! - [`fraud`]: load, normalize, derive, write partitioned output and
//!   summarize a card transaction dataset through the engine session

pub mod fraud;
pub mod ledger;

pub use fraud::{run_fraud_pipeline, FraudPipeline, FraudReport};
pub use ledger::{run_ledger_pipeline, LedgerPipeline, LedgerReport};

use polars::prelude::*;
use serde_json::{Map, Number, Value};

use crate::error::PipelineResult;

/// Convert a table into one JSON object per row.
pub fn frame_to_records(df: &DataFrame) -> PipelineResult<Vec<Value>> {
    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let mut record = Map::new();
        for column in df.get_columns() {
            record.insert(column.name().to_string(), any_value_to_json(column.get(row)?));
        }
        records.push(Value::Object(record));
    }
    Ok(records)
}

fn any_value_to_json(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(v) => Value::from(v),
        AnyValue::Int16(v) => Value::from(v),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt8(v) => Value::from(v),
        AnyValue::UInt16(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => float_to_json(v as f64),
        AnyValue::Float64(v) => float_to_json(v),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        other => Value::String(other.to_string()),
    }
}

fn float_to_json(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}
