//! Conversion module
//!
//! Converts a directory of delimited MAG table files into one Parquet
//! directory per table.
//!
//! # Overview
//!
//! - `ConversionDriver` - Per-file loop: resolve schema, skip, convert
//! - `ConversionSummary` - Counts and per-file shapes for one run
//! - `run` - Acquire a DuckDB engine, drive the conversion, release the engine

mod driver;
mod types;

pub use driver::ConversionDriver;
pub use types::{
    destination_for, staging_for, ConversionJob, ConversionSummary, ConvertedTable,
    OUTPUT_SUFFIX, SUCCESS_MARKER,
};

use crate::config::ConvertConfig;
use crate::engine::{scoped, DuckDbEngine};
use crate::error::Result;
use crate::schema::SchemaRegistry;

/// Convert every known table in `config.input_dir` that has no output yet.
///
/// The DuckDB session is released exactly once, whether the run succeeds or
/// fails part-way.
pub fn run(config: &ConvertConfig, registry: &SchemaRegistry) -> Result<ConversionSummary> {
    config.validate()?;
    let engine = DuckDbEngine::open(&config.engine)?;
    scoped(engine, |engine| ConversionDriver::new(registry, config).run(engine))
}
