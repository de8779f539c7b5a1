//! Schema registry module
//!
//! Maps table names (derived from input file names) to typed column layouts.
//!
//! # Overview
//!
//! - `ColumnType` - The fixed set of semantic column types
//! - `TableSchema` - Ordered, typed columns of one table file
//! - `SchemaRegistry` - Read-only lookup table loaded from YAML
//! - `derive_key` - File name to schema key

mod registry;
mod types;

pub use registry::{derive_key, key_for_path, SchemaRegistry, BUILTIN_REGISTRY};
pub use types::{ColumnDef, ColumnType, RegistryDefinition, TableSchema};

#[cfg(test)]
mod tests;
