//! Engine types and traits
//!
//! Defines the compute engine abstraction used by the conversion driver.

use crate::config::ConvertConfig;
use crate::error::Result;
use crate::schema::TableSchema;
use serde::Serialize;
use std::path::Path;

/// File name of the single Parquet part written into each output directory
pub const PART_FILE_NAME: &str = "part-00000.parquet";

/// How a delimited text file is laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedOptions {
    /// Field separator
    pub separator: char,
    /// Quote character (`None` disables quoting)
    pub quote: Option<char>,
    /// Whether the first line is a header (MAG files have none)
    pub has_header: bool,
    /// Skip rows that cannot be coerced to the schema instead of failing
    pub lenient: bool,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            separator: '\t',
            quote: Some('"'),
            has_header: false,
            lenient: false,
        }
    }
}

impl From<&ConvertConfig> for DelimitedOptions {
    fn from(config: &ConvertConfig) -> Self {
        Self {
            separator: config.separator,
            quote: config.quote,
            has_header: false,
            lenient: config.lenient,
        }
    }
}

/// Shape of a converted table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableStats {
    /// Number of rows written
    pub rows: u64,
    /// Number of columns written
    pub columns: usize,
}

/// A compute engine that can read delimited text under an explicit schema
/// and write it out in columnar form.
///
/// Engines are process-wide resources: acquire one, run every job through it,
/// then release it exactly once. [`EngineSession`](super::EngineSession)
/// guarantees the release on every exit path.
pub trait TableEngine {
    /// Read `source` as delimited text typed by `schema` and write it as
    /// Parquet into the existing directory `destination`.
    ///
    /// The schema is authoritative: a value that cannot be coerced to its
    /// column type fails the call unless `options.lenient` is set.
    fn convert(
        &mut self,
        source: &Path,
        schema: &TableSchema,
        options: &DelimitedOptions,
        destination: &Path,
    ) -> Result<TableStats>;

    /// Release the engine's resources
    fn release(&mut self) -> Result<()>;
}
