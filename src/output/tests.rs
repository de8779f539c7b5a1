//! Tests for output module

use super::*;
use crate::error::Error;
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use std::fs::File;
use std::sync::Arc;
use tempfile::tempdir;

fn sample_batch() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("corpus_paper_id", DataType::Int64, true),
        Field::new("mag_id", DataType::Utf8, true),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])),
            Arc::new(StringArray::from(vec![Some("10"), None, Some("30")])),
        ],
    )
    .unwrap()
}

// ============================================================================
// Writer Config Tests
// ============================================================================

#[test]
fn test_writer_config_default() {
    let config = ParquetWriterConfig::default();
    assert_eq!(config.max_row_group_rows, 1 << 20);
    assert_eq!(config.compression, Compression::SNAPPY);
}

#[test]
fn test_small_row_groups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ids.parquet");
    let batch = sample_batch();
    let config = ParquetWriterConfig {
        compression: Compression::UNCOMPRESSED,
        max_row_group_rows: 2,
    };

    let mut writer = ParquetWriter::create_new(&path, batch.schema().as_ref(), &config).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap()).unwrap();
    assert_eq!(builder.metadata().num_row_groups(), 2);
}

// ============================================================================
// Writer Tests
// ============================================================================

#[test]
fn test_write_and_read_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ids.parquet");
    let batch = sample_batch();

    let mut writer =
        ParquetWriter::create_new(&path, batch.schema().as_ref(), &ParquetWriterConfig::default())
            .unwrap();
    writer.write(&batch).unwrap();
    writer.write(&batch).unwrap();
    assert_eq!(writer.close().unwrap(), 6);

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let total: usize = reader.map(|b| b.unwrap().num_rows()).sum();
    assert_eq!(total, 6);
}

#[test]
fn test_empty_file_has_schema() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.parquet");
    let batch = sample_batch();

    let writer =
        ParquetWriter::create_new(&path, batch.schema().as_ref(), &ParquetWriterConfig::default())
            .unwrap();
    assert_eq!(writer.close().unwrap(), 0);

    assert_eq!(read_parquet_stats(&path).unwrap(), (0, 2));
}

#[test]
fn test_create_new_refuses_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ids.parquet");
    std::fs::write(&path, b"previous run").unwrap();

    let batch = sample_batch();
    let result =
        ParquetWriter::create_new(&path, batch.schema().as_ref(), &ParquetWriterConfig::default());

    assert!(matches!(result, Err(Error::DestinationExists { .. })));
    assert_eq!(std::fs::read(&path).unwrap(), b"previous run");
}

#[test]
fn test_read_parquet_stats() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ids.parquet");
    let batch = sample_batch();

    let mut writer =
        ParquetWriter::create_new(&path, batch.schema().as_ref(), &ParquetWriterConfig::default())
            .unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    assert_eq!(read_parquet_stats(&path).unwrap(), (3, 2));
}

#[test]
fn test_read_parquet_stats_not_parquet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bogus.parquet");
    std::fs::write(&path, b"not parquet").unwrap();

    assert!(read_parquet_stats(&path).is_err());
    assert!(read_parquet_stats(dir.path().join("missing.parquet")).is_err());
}
