//! Conversion types

use crate::engine::TableStats;
use crate::schema::TableSchema;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Suffix appended to a schema key to name its output directory
pub const OUTPUT_SUFFIX: &str = "_parquet";

/// Marker file written into a completed output directory
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Output directory for a schema key
pub fn destination_for(output_dir: &Path, key: &str) -> PathBuf {
    output_dir.join(format!("{key}{OUTPUT_SUFFIX}"))
}

/// Staging directory a conversion writes into before it is moved into place
pub fn staging_for(output_dir: &Path, key: &str) -> PathBuf {
    output_dir.join(format!(".{key}{OUTPUT_SUFFIX}.inprogress"))
}

/// One input file scheduled for conversion during a single run
#[derive(Debug, Clone)]
pub struct ConversionJob<'a> {
    /// Input text file
    pub source_path: PathBuf,
    /// Resolved schema
    pub schema: &'a TableSchema,
    /// Final output directory
    pub destination_path: PathBuf,
}

/// Per-file result of a completed conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedTable {
    /// Schema key
    pub key: String,
    /// Input text file
    pub source: PathBuf,
    /// Output directory
    pub destination: PathBuf,
    /// Number of rows written
    pub rows: u64,
    /// Number of columns written
    pub columns: usize,
}

impl ConvertedTable {
    pub(crate) fn new(job: &ConversionJob<'_>, stats: TableStats) -> Self {
        Self {
            key: job.schema.name.clone(),
            source: job.source_path.clone(),
            destination: job.destination_path.clone(),
            rows: stats.rows,
            columns: stats.columns,
        }
    }
}

/// Outcome of one driver run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    /// Candidate files found
    pub files_found: usize,
    /// Files whose key has no schema
    pub skipped_no_schema: Vec<PathBuf>,
    /// Files whose destination already existed
    pub skipped_existing: Vec<PathBuf>,
    /// Files converted in this run
    pub converted: Vec<ConvertedTable>,
}

impl ConversionSummary {
    /// Number of files converted
    pub fn converted_count(&self) -> usize {
        self.converted.len()
    }

    /// Total number of skipped files
    pub fn skipped_count(&self) -> usize {
        self.skipped_no_schema.len() + self.skipped_existing.len()
    }

    /// Total rows written across all converted files
    pub fn total_rows(&self) -> u64 {
        self.converted.iter().map(|t| t.rows).sum()
    }
}
