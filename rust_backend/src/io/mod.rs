//! Table input and output.
//!
//! This module reads delimited text files into DataFrames and persists
//! DataFrames as Hive-style partitioned Parquet directories.
//!
//! # Example
//!
//! ```no_run
//! use txn_etl::io::loaders::CsvLoader;
//! use std::path::Path;
//!
//! let df = CsvLoader::default()
//!     .load(Path::new("transactions.csv"))
//!     .expect("Failed to load");
//! println!("Loaded {} rows", df.height());
//! ```

pub mod loaders;
pub mod writers;


pub use loaders::CsvLoader;
pub use writers::{write_partitioned_parquet, PartitionInfo, PartitionManifest, WriteMode};
