//! Compute engine module
//!
//! The engine does the heavy lifting for the conversion driver: typed reads of
//! delimited text and columnar writes.
//!
//! # Overview
//!
//! The engine module provides:
//! - `TableEngine` - The read-under-schema / write-Parquet contract
//! - `DuckDbEngine` - In-process DuckDB implementation
//! - `EngineSession` / `scoped` - Exactly-once release on every exit path

mod duckdb_engine;
mod session;
mod types;

pub use duckdb_engine::DuckDbEngine;
pub(crate) use duckdb_engine::sql_literal;
pub use session::{scoped, EngineSession};
pub use types::{DelimitedOptions, TableEngine, TableStats, PART_FILE_NAME};
