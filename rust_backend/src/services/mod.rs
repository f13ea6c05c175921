//! Read-only analysis over transformed tables.
//!
//! - [`quality`]: Data quality findings for ledger rows
//! - [`statistics`]: Descriptive statistics and amount histograms

pub mod quality;
pub mod statistics;

pub use quality::{check_quality, QualityFinding, QualityReport};
pub use statistics::{
    column_histogram, describe, histogram, ColumnSummary, DescriptiveStatistics, HistogramBin,
};
