//! Grouped aggregation and correlation.
//!
//! # Components
//!
//! - [`aggregation`]: Calendar bucket totals and per-flag fraud summaries
//! - [`correlation`]: Pearson correlation between two numeric columns
//!
//! # Example
//!
//! ```ignore
//! use txn_etl::algorithms::summarize_periods;
//! use polars::prelude::*;
//!
//! # fn example(df: &DataFrame) -> txn_etl::PipelineResult<()> {
//! let summaries = summarize_periods(df)?;
//! println!("{}", summaries.monthly);
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod correlation;

pub use aggregation::{
    assign_calendar_buckets, class_distribution, fraud_amount_requests, fraud_amount_summary,
    fraud_ratio, summarize_periods, PeriodSummaries,
};
pub use correlation::pearson_correlation;
