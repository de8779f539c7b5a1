//! Query sources for the extraction step

use crate::config::WarehouseConfig;
use crate::engine::sql_literal;
use crate::error::{Error, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use duckdb::Connection;
use std::path::Path;

/// Alias the source database is attached under
const SOURCE_ALIAS: &str = "source_db";

/// Fully materialized query result
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Result schema, present even when there are no rows
    pub schema: SchemaRef,
    /// Result rows
    pub batches: Vec<RecordBatch>,
}

impl QueryResult {
    /// Total number of rows across batches
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

/// Something that can run a SQL query and return Arrow batches
pub trait QuerySource {
    /// Run `sql` and materialize the result
    fn query(&self, sql: &str) -> Result<QueryResult>;
}

/// Relational source reached through DuckDB.
///
/// The remote database is attached read-only and made the default catalog,
/// so queries written against the warehouse run unchanged.
pub struct Warehouse {
    conn: Connection,
    description: String,
}

impl std::fmt::Debug for Warehouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warehouse")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Warehouse {
    /// Connect to a PostgreSQL-protocol warehouse (Redshift)
    pub fn connect(config: &WarehouseConfig) -> Result<Self> {
        let description = config.masked_connection_string();
        tracing::info!("Connecting to {description}");

        let conn = Connection::open_in_memory()?;
        conn.execute_batch("INSTALL postgres; LOAD postgres;")
            .map_err(|e| Error::query(format!("Failed to load postgres extension: {e}")))?;

        let attach = format!(
            "ATTACH {} AS {SOURCE_ALIAS} (TYPE POSTGRES, READ_ONLY); USE {SOURCE_ALIAS};",
            sql_literal(&config.connection_string())
        );
        conn.execute_batch(&attach)
            .map_err(|e| Error::query(format!("Failed to attach {description}: {e}")))?;

        Ok(Self { conn, description })
    }

    /// Open a local DuckDB database file as the source
    pub fn open_local(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let conn = Connection::open_in_memory()?;
        let attach = format!(
            "ATTACH {} AS {SOURCE_ALIAS} (READ_ONLY); USE {SOURCE_ALIAS};",
            sql_literal(&path.to_string_lossy())
        );
        conn.execute_batch(&attach).map_err(|e| {
            Error::query(format!("Failed to attach {}: {e}", path.display()))
        })?;

        Ok(Self {
            conn,
            description: path.display().to_string(),
        })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection, description: impl Into<String>) -> Self {
        Self {
            conn,
            description: description.into(),
        }
    }

    /// Human-readable source description, with credentials masked
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl QuerySource for Warehouse {
    fn query(&self, sql: &str) -> Result<QueryResult> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| Error::query(format!("{e}")))?;
        let arrow = stmt
            .query_arrow([])
            .map_err(|e| Error::query(format!("{e}")))?;

        let schema = arrow.get_schema();
        let batches: Vec<RecordBatch> = arrow.collect();

        Ok(QueryResult { schema, batches })
    }
}
