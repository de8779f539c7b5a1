//! Error types for mag-etl
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Schema misses and already-converted destinations are *not* errors for the
//! conversion driver; they are recorded in its summary instead.

use std::path::Path;
use thiserror::Error;

/// The main error type for mag-etl
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Schema Registry Errors
    // ============================================================================
    #[error("Duplicate schema key: {key}")]
    DuplicateSchema { key: String },

    #[error("Invalid schema '{key}': {message}")]
    InvalidSchema { key: String, message: String },

    // ============================================================================
    // Engine Errors
    // ============================================================================
    #[error("Engine error: {message}")]
    Engine { message: String },

    #[error("Failed to convert '{path}': {message}")]
    Conversion { path: String, message: String },

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    // ============================================================================
    // Extraction Errors
    // ============================================================================
    #[error("Destination already exists: {path}")]
    DestinationExists { path: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Column '{column}' not found in result set")]
    ColumnNotFound { column: String },

    #[error("Failed to explode column '{column}': {message}")]
    Explode { column: String, message: String },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid schema error
    pub fn invalid_schema(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an engine error
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Create a conversion error for a source file
    pub fn conversion(path: &Path, message: impl Into<String>) -> Self {
        Self::Conversion {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create a destination-exists error
    pub fn destination_exists(path: &Path) -> Self {
        Self::DestinationExists {
            path: path.display().to_string(),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create an explode error
    pub fn explode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Explode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error comes from configuration rather than data
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::YamlParse(_)
                | Error::DuplicateSchema { .. }
                | Error::InvalidSchema { .. }
        )
    }
}

/// Result type alias for mag-etl
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("S2_REDSHIFT_DEV_HOST");
        assert_eq!(
            err.to_string(),
            "Missing required config field: S2_REDSHIFT_DEV_HOST"
        );

        let err = Error::destination_exists(&PathBuf::from("/tmp/ids.parquet"));
        assert_eq!(
            err.to_string(),
            "Destination already exists: /tmp/ids.parquet"
        );

        let err = Error::conversion(&PathBuf::from("Papers.txt"), "bad row");
        assert_eq!(err.to_string(), "Failed to convert 'Papers.txt': bad row");
    }

    #[test]
    fn test_is_config() {
        assert!(Error::config("x").is_config());
        assert!(Error::missing_field("x").is_config());
        assert!(Error::invalid_value("sep", "x").is_config());
        assert!(Error::DuplicateSchema {
            key: "Papers".to_string()
        }
        .is_config());

        assert!(!Error::engine("x").is_config());
        assert!(!Error::query("x").is_config());
        assert!(!Error::destination_exists(&PathBuf::from("a")).is_config());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }

    #[test]
    fn test_result_with_context_io() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result
            .with_context(|| "Failed to create output directory".to_string())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to create output directory: IO error: denied"
        );
    }
}
