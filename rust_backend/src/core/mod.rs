//! Core domain definitions for transaction processing.
//!
//! This module defines the column vocabulary shared by both pipelines, the
//! enumerated transaction types, and the step-to-timestamp conversion.

pub mod domain;

pub use domain::{
    step_to_timestamp, TransactionType, DEFAULT_CONVERSION_RATE, DEFAULT_EPOCH, VALID_TYPES,
};
