//! Schema registry
//!
//! Maps schema keys to table schemas. The registry is data, not code: it is
//! parsed once at start-up from a YAML document, either the one embedded in
//! the binary or a user-supplied file.

use super::types::{RegistryDefinition, TableSchema};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Embedded Microsoft Academic Graph registry
pub const BUILTIN_REGISTRY: &str = include_str!("../../schemas/mag.yaml");

/// Derive the schema key from a file name.
///
/// The key is everything before the first `.`, so `Papers.txt.gz` and
/// `Papers.txt` both map to `Papers`. A name without a dot is its own key.
pub fn derive_key(file_name: &str) -> &str {
    match file_name.split_once('.') {
        Some((key, _)) => key,
        None => file_name,
    }
}

/// Derive the schema key for a path, using its final component
pub fn key_for_path(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str()).map(derive_key)
}

/// Immutable lookup table from schema key to table schema
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: BTreeMap<String, TableSchema>,
}

impl SchemaRegistry {
    /// Load the embedded MAG registry
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_REGISTRY)
    }

    /// Load a registry from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read schema file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load a registry from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let def: RegistryDefinition = serde_yaml::from_str(yaml)?;
        if def.kind != "schema_registry" {
            return Err(Error::config(format!(
                "Expected kind 'schema_registry', found '{}'",
                def.kind
            )));
        }
        Self::from_tables(def.tables)
    }

    /// Build a registry from table schemas, validating each one
    pub fn from_tables(tables: impl IntoIterator<Item = TableSchema>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for table in tables {
            validate_table(&table)?;
            if map.contains_key(&table.name) {
                return Err(Error::DuplicateSchema { key: table.name });
            }
            map.insert(table.name.clone(), table);
        }
        Ok(Self { tables: map })
    }

    /// Resolve a schema key
    pub fn resolve(&self, key: &str) -> Option<&TableSchema> {
        self.tables.get(key)
    }

    /// Check whether a key is known
    pub fn contains(&self, key: &str) -> bool {
        self.tables.contains_key(key)
    }

    /// Known keys, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// All schemas, sorted by key
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    /// Number of schemas
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn validate_table(table: &TableSchema) -> Result<()> {
    if table.name.is_empty() {
        return Err(Error::invalid_schema("", "schema name cannot be empty"));
    }
    if table.name.contains('.') {
        return Err(Error::invalid_schema(
            &table.name,
            "schema name cannot contain '.'",
        ));
    }
    if table.columns.is_empty() {
        return Err(Error::invalid_schema(
            &table.name,
            "schema must have at least one column",
        ));
    }

    let mut seen = HashSet::new();
    for column in &table.columns {
        if column.name.is_empty() {
            return Err(Error::invalid_schema(
                &table.name,
                "column name cannot be empty",
            ));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(Error::invalid_schema(
                &table.name,
                format!("duplicate column '{}'", column.name),
            ));
        }
    }

    Ok(())
}
