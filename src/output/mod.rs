//! Output module
//!
//! Handles Parquet file writing and inspection.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing Arrow RecordBatches to a new Parquet file
//! - Reading row/column counts back from a Parquet footer

mod writer;

pub use writer::{read_parquet_stats, ParquetWriter, ParquetWriterConfig};

#[cfg(test)]
mod tests;
