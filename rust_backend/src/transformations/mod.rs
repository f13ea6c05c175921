//! Data cleansing and feature derivation.
//!
//! This module provides the row-level stages of both pipelines: cleansing
//! ledger rows and normalizing card rows, then deriving the converted amount,
//! timestamp, log amount and fraud label columns.
//!
//! # Modules
//!
//! - [`cleaning`]: Remove duplicates, missing rows, invalid types and amounts
//! - [`features`]: Pure per-row derived columns
//!
//! # Example
//!
//! ```no_run
//! use txn_etl::core::domain::default_epoch;
//! use txn_etl::transformations::{cleanse_ledger, transform_ledger};
//! use polars::prelude::*;
//!
//! # fn example(raw: DataFrame) -> txn_etl::PipelineResult<()> {
//! let cleansed = cleanse_ledger(&raw)?;
//! let transformed = transform_ledger(&cleansed, 1.1, default_epoch())?;
//! # Ok(())
//! # }
//! ```

pub mod cleaning;
pub mod features;

pub use cleaning::{
    cleanse_ledger, normalize_card_transactions, require_columns, valid_type_predicate,
};
pub use features::{derive_fraud_features, step_timestamp_expr, transform_ledger};
