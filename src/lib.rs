// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # mag-etl
//!
//! Converts Microsoft Academic Graph (MAG) text table dumps into Parquet and
//! extracts the Semantic Scholar paper / MAG id mapping from the warehouse.
//!
//! ## Features
//!
//! - **Schema registry**: MAG table layouts as declarative YAML, keyed by file name
//! - **Resumable conversion**: existing outputs are skipped, partial outputs never appear
//! - **Scoped engine**: one DuckDB session per run, released on every exit path
//! - **Id extraction**: query, explode a delimited id column, write one Parquet file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mag_etl::config::ConvertConfig;
//! use mag_etl::schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::builtin()?;
//! let config = ConvertConfig::new("/data/mag", "/data/mag_parquet");
//! let summary = mag_etl::convert::run(&config, &registry)?;
//! println!("converted {} tables", summary.converted_count());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────────────┐
//! │ input dir    │──▶│ ConversionDriver │──▶│ <Key>_parquet/      │
//! │ Papers.txt   │   │  SchemaRegistry  │   │   part-00000.parquet│
//! │ Authors.txt  │   │  TableEngine     │   │   _SUCCESS          │
//! └──────────────┘   └──────────────────┘   └─────────────────────┘
//!
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────────────┐
//! │ QuerySource  │──▶│ explode_column   │──▶│ ids.parquet         │
//! └──────────────┘   └──────────────────┘   └─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Run configuration
pub mod config;

/// MAG schema registry
pub mod schema;

/// Compute engine sessions (DuckDB)
pub mod engine;

/// Directory-to-Parquet conversion
pub mod convert;

/// Parquet output
pub mod output;

/// Warehouse extraction and row explosion
pub mod extract;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
