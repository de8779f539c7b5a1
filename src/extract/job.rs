//! One-shot extraction: query, explode, write a single Parquet file

use super::explode::{explode_column, exploded_schema};
use super::warehouse::QuerySource;
use crate::config::ExtractConfig;
use crate::error::{Error, Result};
use crate::output::{ParquetWriter, ParquetWriterConfig};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    /// Output Parquet file
    pub destination: PathBuf,
    /// Rows returned by the query
    pub source_rows: usize,
    /// Rows written after explosion
    pub output_rows: usize,
    /// Columns written
    pub columns: usize,
}

/// Run the configured query and write its exploded result to a new file.
///
/// Unlike conversion, an existing destination is an error; it is checked
/// before the query runs.
pub fn extract_and_explode<S: QuerySource + ?Sized>(
    source: &S,
    config: &ExtractConfig,
) -> Result<ExtractionSummary> {
    config.validate()?;

    if config.destination.exists() {
        return Err(Error::destination_exists(&config.destination));
    }

    tracing::info!("Running query");
    tracing::debug!("query: {}", config.query);
    let result = source.query(&config.query)?;
    let source_rows = result.num_rows();
    tracing::info!(rows = source_rows, "Query returned");

    let schema = exploded_schema(&result.schema, &config.list_column)?;
    let batches = result
        .batches
        .iter()
        .map(|batch| {
            explode_column(
                batch,
                &config.list_column,
                &config.delimiter,
                config.null_policy,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Writing {}", config.destination.display());
    let output_rows = write_new_file(&config.destination, &schema, &batches, &config.writer)?;
    tracing::info!(rows = output_rows, "Extraction complete");

    Ok(ExtractionSummary {
        destination: config.destination.clone(),
        source_rows,
        output_rows,
        columns: schema.fields().len(),
    })
}

/// Write batches to a file that must not exist yet, removing it on failure
fn write_new_file(
    path: &Path,
    schema: &Schema,
    batches: &[RecordBatch],
    config: &ParquetWriterConfig,
) -> Result<usize> {
    let mut writer = ParquetWriter::create_new(path, schema, config)?;

    let written = batches
        .iter()
        .try_for_each(|batch| writer.write(batch))
        .and_then(|()| writer.close());

    if written.is_err() {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to remove partial file {}: {e}", path.display());
        }
    }
    written
}
