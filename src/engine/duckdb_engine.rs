//! DuckDB-backed table engine
//!
//! Reads delimited text with `read_csv` under an explicit column list and
//! writes Parquet with `COPY ... TO`. Compressed inputs (`.gz`, `.zst`) are
//! decompressed by DuckDB based on the file extension.

use super::types::{DelimitedOptions, TableEngine, TableStats, PART_FILE_NAME};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::output::read_parquet_stats;
use crate::schema::TableSchema;
use duckdb::Connection;
use std::path::Path;

/// In-process DuckDB session used as the compute engine
pub struct DuckDbEngine {
    /// DuckDB connection, `None` once released
    conn: Option<Connection>,
}

impl DuckDbEngine {
    /// Open an in-memory session with the given settings
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::engine(format!("Failed to create DuckDB connection: {e}")))?;

        let memory_limit = config.memory_limit.to_duckdb_setting();
        conn.execute_batch(&format!(
            "SET memory_limit = {};",
            sql_literal(&memory_limit)
        ))
        .map_err(|e| Error::engine(format!("Failed to set memory limit: {e}")))?;

        if let Some(threads) = config.threads {
            conn.execute_batch(&format!("SET threads = {threads};"))
                .map_err(|e| Error::engine(format!("Failed to set threads: {e}")))?;
        }

        if let Some(dir) = &config.temp_directory {
            conn.execute_batch(&format!(
                "SET temp_directory = {};",
                sql_literal(&dir.to_string_lossy())
            ))
            .map_err(|e| Error::engine(format!("Failed to set temp directory: {e}")))?;
        }

        tracing::debug!(memory_limit = %memory_limit, threads = ?config.threads, "Opened DuckDB session");

        Ok(Self { conn: Some(conn) })
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| Error::engine("DuckDB session already released"))
    }

    /// Build the `read_csv` table function call for a source file
    fn read_csv_sql(source: &Path, schema: &TableSchema, options: &DelimitedOptions) -> String {
        let columns = schema
            .columns
            .iter()
            .map(|c| format!("{}: {}", sql_literal(&c.name), sql_literal(c.column_type.sql_type())))
            .collect::<Vec<_>>()
            .join(", ");

        // Without a quote character, `"` must not act as an escape either
        let quote = options.quote.map(String::from).unwrap_or_default();

        format!(
            "read_csv({source}, delim = {delim}, quote = {quote}, escape = {quote}, header = {header}, \
             auto_detect = false, columns = {{{columns}}}, ignore_errors = {lenient})",
            source = sql_literal(&source.to_string_lossy()),
            delim = sql_literal(&options.separator.to_string()),
            quote = sql_literal(&quote),
            header = options.has_header,
            lenient = options.lenient,
        )
    }

    /// Build the `COPY` statement writing one Parquet part
    fn copy_sql(read_sql: &str, part: &Path) -> String {
        format!(
            "COPY (SELECT * FROM {read_sql}) TO {} (FORMAT PARQUET, COMPRESSION 'SNAPPY');",
            sql_literal(&part.to_string_lossy())
        )
    }
}

impl TableEngine for DuckDbEngine {
    fn convert(
        &mut self,
        source: &Path,
        schema: &TableSchema,
        options: &DelimitedOptions,
        destination: &Path,
    ) -> Result<TableStats> {
        let conn = self.conn()?;
        let part = destination.join(PART_FILE_NAME);

        let sql = Self::copy_sql(&Self::read_csv_sql(source, schema, options), &part);
        tracing::debug!("Executing: {}", sql);

        conn.execute_batch(&sql)
            .map_err(|e| Error::conversion(source, e.to_string()))?;

        let (rows, columns) = read_parquet_stats(&part)?;
        Ok(TableStats { rows, columns })
    }

    fn release(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| {
                Error::engine(format!("Failed to close DuckDB connection: {e}"))
            })?;
            tracing::debug!("Closed DuckDB session");
        }
        Ok(())
    }
}

/// Quote a string as a SQL literal
pub(crate) fn sql_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDef, ColumnType};
    use std::path::PathBuf;

    fn ids_schema() -> TableSchema {
        TableSchema::new(
            "PaperReferences",
            vec![
                ColumnDef::new("PaperId", ColumnType::Integer),
                ColumnDef::new("PaperReferenceId", ColumnType::Integer),
            ],
        )
    }

    #[test]
    fn test_sql_literal_escapes_quotes() {
        assert_eq!(sql_literal("plain"), "'plain'");
        assert_eq!(sql_literal("it's"), "'it''s'");
    }

    #[test]
    fn test_read_csv_sql() {
        let sql = DuckDbEngine::read_csv_sql(
            &PathBuf::from("/data/PaperReferences.txt.gz"),
            &ids_schema(),
            &DelimitedOptions::default(),
        );

        assert!(sql.starts_with("read_csv('/data/PaperReferences.txt.gz'"));
        assert!(sql.contains("delim = '\t'"));
        assert!(sql.contains("header = false"));
        assert!(sql.contains("auto_detect = false"));
        assert!(sql.contains("columns = {'PaperId': 'BIGINT', 'PaperReferenceId': 'BIGINT'}"));
        assert!(sql.contains("ignore_errors = false"));
    }

    #[test]
    fn test_read_csv_sql_lenient_no_quote() {
        let options = DelimitedOptions {
            separator: ',',
            quote: None,
            has_header: false,
            lenient: true,
        };
        let sql = DuckDbEngine::read_csv_sql(&PathBuf::from("a.txt"), &ids_schema(), &options);
        assert!(sql.contains("delim = ','"));
        assert!(sql.contains("quote = ''"));
        assert!(sql.contains("escape = ''"));
        assert!(sql.contains("ignore_errors = true"));
    }

    #[test]
    fn test_open_and_release() {
        let mut engine = DuckDbEngine::open(&EngineConfig::default().with_threads(1)).unwrap();
        assert!(engine.conn().is_ok());

        engine.release().unwrap();
        assert!(engine.conn().is_err());

        // Releasing twice is a no-op
        engine.release().unwrap();
    }

    #[test]
    fn test_convert_after_release_fails() {
        let mut engine = DuckDbEngine::open(&EngineConfig::default()).unwrap();
        engine.release().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let err = engine
            .convert(
                &dir.path().join("x.txt"),
                &ids_schema(),
                &DelimitedOptions::default(),
                dir.path(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Engine { .. }));
    }
}
