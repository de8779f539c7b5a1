//! Schema types

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use serde::{Deserialize, Serialize};

/// Semantic type of a column in a delimited text table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
}

impl ColumnType {
    /// DuckDB SQL type used when reading the column
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::String => "VARCHAR",
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }

    /// Arrow data type the column has once written to Parquet
    pub fn arrow_type(self) -> DataType {
        match self {
            ColumnType::String => DataType::Utf8,
            ColumnType::Integer => DataType::Int64,
            ColumnType::Float => DataType::Float64,
            ColumnType::Boolean => DataType::Boolean,
            ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,

    /// Semantic type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnDef {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered column layout of one table file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Schema key (leading segment of the table's file name)
    pub name: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Columns in file order
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Create a new table schema
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            description: None,
            columns,
        }
    }

    /// Number of declared columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in file order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Arrow schema of the converted table. Every field is nullable, since
    /// empty fields in the text files read as nulls.
    pub fn to_arrow_schema(&self) -> Schema {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|c| Field::new(&c.name, c.column_type.arrow_type(), true))
            .collect();
        Schema::new(fields)
    }
}

/// On-disk registry document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryDefinition {
    /// Kind of document (always "schema_registry")
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Document version
    #[serde(default = "default_version")]
    pub version: String,

    /// Table schemas
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

fn default_kind() -> String {
    "schema_registry".to_string()
}

fn default_version() -> String {
    "1.0".to_string()
}
