//! Extraction module
//!
//! Pulls the S2 paper / MAG id mapping out of the warehouse and writes it as
//! one Parquet file, one row per MAG id.
//!
//! # Overview
//!
//! - `QuerySource` - Anything that can run SQL and return Arrow batches
//! - `Warehouse` - DuckDB session attached to Redshift/PostgreSQL or a local file
//! - `explode_column` - Split a delimited column into one row per token
//! - `extract_and_explode` - Precondition check, query, explode, write

mod explode;
mod job;
mod warehouse;

pub use explode::{explode_column, exploded_schema, NullPolicy};
pub use job::{extract_and_explode, ExtractionSummary};
pub use warehouse::{QueryResult, QuerySource, Warehouse};
