//! Row explosion over Arrow record batches
//!
//! Turns one row whose list column holds `"10,20,30"` into three rows, one
//! per token, copying every other column unchanged.

use crate::error::{Error, Result};
use arrow::array::{Array, ArrayRef, StringArray, StringBuilder, UInt32Builder};
use arrow::compute::{cast, take};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use std::sync::Arc;

/// How a null list value is handled
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Keep the row once, with a null list value
    #[default]
    Passthrough,
    /// Drop the row
    Drop,
    /// Fail the extraction
    Error,
}

/// Schema of a batch after `column` has been exploded.
///
/// The list column becomes a nullable Utf8 column in the same position.
pub fn exploded_schema(schema: &Schema, column: &str) -> Result<Schema> {
    let (index, _) = schema
        .column_with_name(column)
        .ok_or_else(|| Error::ColumnNotFound {
            column: column.to_string(),
        })?;

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| {
            if i == index {
                Field::new(field.name(), DataType::Utf8, true)
            } else {
                field.as_ref().clone()
            }
        })
        .collect();

    Ok(Schema::new_with_metadata(fields, schema.metadata().clone()))
}

/// Explode `column` of `batch` on `delimiter`.
///
/// Non-string list columns are cast to Utf8 first. Rows keep their original
/// order and tokens keep their split order.
pub fn explode_column(
    batch: &RecordBatch,
    column: &str,
    delimiter: &str,
    policy: NullPolicy,
) -> Result<RecordBatch> {
    if delimiter.is_empty() {
        return Err(Error::invalid_value("delimiter", "delimiter cannot be empty"));
    }

    let schema = batch.schema();
    let output_schema = Arc::new(exploded_schema(&schema, column)?);
    let (index, _) = schema
        .column_with_name(column)
        .ok_or_else(|| Error::ColumnNotFound {
            column: column.to_string(),
        })?;

    let values = cast(batch.column(index), &DataType::Utf8)
        .map_err(|e| Error::explode(column, format!("cannot read values as text: {e}")))?;
    let values = values
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| Error::explode(column, "expected a Utf8 array after cast"))?;

    let mut indices = UInt32Builder::with_capacity(values.len());
    let mut tokens = StringBuilder::new();

    for row in 0..values.len() {
        let source_row = u32::try_from(row)
            .map_err(|_| Error::explode(column, "batch has too many rows"))?;

        if values.is_null(row) {
            match policy {
                NullPolicy::Passthrough => {
                    indices.append_value(source_row);
                    tokens.append_null();
                }
                NullPolicy::Drop => {}
                NullPolicy::Error => {
                    return Err(Error::explode(column, format!("null value in row {row}")));
                }
            }
            continue;
        }

        for token in values.value(row).split(delimiter) {
            indices.append_value(source_row);
            tokens.append_value(token);
        }
    }

    let indices = indices.finish();
    let exploded: ArrayRef = Arc::new(tokens.finish());

    let columns = batch
        .columns()
        .iter()
        .enumerate()
        .map(|(i, array)| {
            if i == index {
                Ok(Arc::clone(&exploded))
            } else {
                take(array.as_ref(), &indices, None).map_err(Error::from)
            }
        })
        .collect::<Result<Vec<ArrayRef>>>()?;

    Ok(RecordBatch::try_new(output_schema, columns)?)
}
