//! Single-file Parquet output
//!
//! The extraction step writes exactly one file and must never replace an
//! existing one, so the file is opened with `create_new`.

use crate::error::{Error, Result};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parquet encoding settings
#[derive(Debug, Clone, Copy)]
pub struct ParquetWriterConfig {
    /// Column chunk compression
    pub compression: Compression,
    /// Upper bound on rows per row group
    pub max_row_group_rows: usize,
}

impl Default for ParquetWriterConfig {
    /// Snappy with 1Mi-row groups, the same codec the conversion path uses
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            max_row_group_rows: 1 << 20,
        }
    }
}

impl ParquetWriterConfig {
    fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.max_row_group_rows)
            .build()
    }
}

/// Writer for a Parquet file that did not exist before
pub struct ParquetWriter {
    inner: ArrowWriter<File>,
    path: PathBuf,
    rows: usize,
}

impl ParquetWriter {
    /// Create `path` and prepare to write batches of `schema`.
    ///
    /// Fails with [`Error::DestinationExists`] if `path` already exists; the
    /// existing file is left untouched.
    pub fn create_new(
        path: impl AsRef<Path>,
        schema: &Schema,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::destination_exists(&path));
            }
            Err(e) => {
                return Err(Error::output(format!("cannot create {}: {e}", path.display())));
            }
        };

        let inner = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(config.properties()))?;
        tracing::debug!(path = %path.display(), columns = schema.fields().len(), "Opened Parquet file");

        Ok(Self {
            inner,
            path,
            rows: 0,
        })
    }

    /// Append one batch
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.inner
            .write(batch)
            .map_err(|e| Error::output(format!("write to {} failed: {e}", self.path.display())))?;
        self.rows += batch.num_rows();
        Ok(())
    }

    /// Flush the footer and return the number of rows written
    pub fn close(self) -> Result<usize> {
        let Self { inner, path, rows } = self;
        inner
            .close()
            .map_err(|e| Error::output(format!("cannot finish {}: {e}", path.display())))?;
        Ok(rows)
    }
}

/// Read the row and leaf-column counts of a Parquet file from its footer
pub fn read_parquet_stats(path: impl AsRef<Path>) -> Result<(u64, usize)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::output(format!("Failed to open Parquet file {}: {e}", path.display()))
    })?;
    let reader = SerializedFileReader::new(file)?;
    let metadata = reader.metadata().file_metadata();

    let rows = u64::try_from(metadata.num_rows())
        .map_err(|_| Error::output(format!("Negative row count in {}", path.display())))?;
    Ok((rows, metadata.schema_descr().num_columns()))
}
