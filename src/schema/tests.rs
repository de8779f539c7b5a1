//! Schema registry tests

use super::*;
use crate::error::Error;
use arrow::datatypes::{DataType, TimeUnit};
use pretty_assertions::assert_eq;
use std::path::Path;
use test_case::test_case;

// ============================================================================
// Key Derivation
// ============================================================================

#[test_case("Papers.txt", "Papers" ; "plain text file")]
#[test_case("Papers.txt.gz", "Papers" ; "compressed text file")]
#[test_case("papers.txt.gz", "papers" ; "lowercase")]
#[test_case("PaperReferences", "PaperReferences" ; "no extension")]
#[test_case(".hidden.txt", "" ; "leading dot")]
fn test_derive_key(file_name: &str, expected: &str) {
    assert_eq!(derive_key(file_name), expected);
}

#[test]
fn test_key_for_path_uses_file_name() {
    let path = Path::new("/data/mag.2020-01-23/Authors.txt.gz");
    assert_eq!(key_for_path(path), Some("Authors"));
}

// ============================================================================
// Builtin Registry
// ============================================================================

#[test]
fn test_builtin_registry_loads() {
    let registry = SchemaRegistry::builtin().unwrap();
    assert!(!registry.is_empty());

    for key in [
        "Affiliations",
        "Authors",
        "FieldsOfStudy",
        "PaperAuthorAffiliations",
        "PaperFieldsOfStudy",
        "PaperReferences",
        "Papers",
    ] {
        assert!(registry.contains(key), "missing schema {key}");
    }
}

#[test]
fn test_builtin_papers_schema() {
    let registry = SchemaRegistry::builtin().unwrap();
    let papers = registry.resolve("Papers").unwrap();

    assert_eq!(papers.column_count(), 25);
    assert_eq!(papers.columns[0], ColumnDef::new("PaperId", ColumnType::Integer));
    assert_eq!(
        papers.column("Date").map(|c| c.column_type),
        Some(ColumnType::Timestamp)
    );
    assert_eq!(papers.column_names().last(), Some(&"CreatedDate"));
}

#[test]
fn test_resolve_miss() {
    let registry = SchemaRegistry::builtin().unwrap();
    assert!(registry.resolve("NotATable").is_none());
    assert!(registry.resolve("papers").is_none());
}

#[test]
fn test_keys_sorted() {
    let registry = SchemaRegistry::builtin().unwrap();
    let keys: Vec<&str> = registry.keys().collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
    assert_eq!(keys.len(), registry.len());
}

// ============================================================================
// YAML Loading & Validation
// ============================================================================

#[test]
fn test_from_yaml_str() {
    let yaml = r"
kind: schema_registry
tables:
  - name: ids
    description: Paper id pairs
    columns:
      - { name: paper_id, type: integer }
      - { name: score, type: float }
      - { name: active, type: boolean }
";
    let registry = SchemaRegistry::from_yaml_str(yaml).unwrap();
    let ids = registry.resolve("ids").unwrap();
    assert_eq!(ids.description.as_deref(), Some("Paper id pairs"));
    assert_eq!(ids.column_names(), vec!["paper_id", "score", "active"]);
}

#[test]
fn test_duplicate_key_rejected() {
    let yaml = r"
tables:
  - name: Papers
    columns: [{ name: PaperId, type: integer }]
  - name: Papers
    columns: [{ name: PaperId, type: integer }]
";
    let err = SchemaRegistry::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, Error::DuplicateSchema { ref key } if key == "Papers"));
}

#[test]
fn test_duplicate_column_rejected() {
    let yaml = r"
tables:
  - name: Papers
    columns:
      - { name: PaperId, type: integer }
      - { name: PaperId, type: string }
";
    let err = SchemaRegistry::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, Error::InvalidSchema { .. }));
    assert!(err.to_string().contains("duplicate column 'PaperId'"));
}

#[test]
fn test_empty_columns_rejected() {
    let yaml = "tables:\n  - name: Empty\n    columns: []\n";
    let err = SchemaRegistry::from_yaml_str(yaml).unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_dotted_name_rejected() {
    let yaml = "tables:\n  - name: Papers.txt\n    columns: [{ name: a, type: string }]\n";
    let err = SchemaRegistry::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, Error::InvalidSchema { .. }));
}

#[test]
fn test_unknown_type_rejected() {
    let yaml = "tables:\n  - name: T\n    columns: [{ name: a, type: decimal }]\n";
    let err = SchemaRegistry::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, Error::YamlParse(_)));
}

#[test]
fn test_wrong_kind_rejected() {
    let yaml = "kind: connector\ntables: []\n";
    let err = SchemaRegistry::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_from_file_missing() {
    let err = SchemaRegistry::from_file("/nonexistent/schemas.yaml").unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[test]
fn test_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schemas.yaml");
    std::fs::write(
        &path,
        "tables:\n  - name: T\n    columns: [{ name: a, type: string }]\n",
    )
    .unwrap();

    let registry = SchemaRegistry::from_file(&path).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("T"));
}

// ============================================================================
// Type Mapping
// ============================================================================

#[test_case(ColumnType::String, "VARCHAR", DataType::Utf8)]
#[test_case(ColumnType::Integer, "BIGINT", DataType::Int64)]
#[test_case(ColumnType::Float, "DOUBLE", DataType::Float64)]
#[test_case(ColumnType::Boolean, "BOOLEAN", DataType::Boolean)]
#[test_case(ColumnType::Timestamp, "TIMESTAMP", DataType::Timestamp(TimeUnit::Microsecond, None))]
fn test_type_mapping(column_type: ColumnType, sql: &str, arrow: DataType) {
    assert_eq!(column_type.sql_type(), sql);
    assert_eq!(column_type.arrow_type(), arrow);
}

#[test]
fn test_to_arrow_schema() {
    let schema = TableSchema::new(
        "PaperFieldsOfStudy",
        vec![
            ColumnDef::new("PaperId", ColumnType::Integer),
            ColumnDef::new("FieldOfStudyId", ColumnType::Integer),
            ColumnDef::new("Score", ColumnType::Float),
        ],
    );

    let arrow = schema.to_arrow_schema();
    assert_eq!(arrow.fields().len(), 3);
    assert_eq!(arrow.field(2).name(), "Score");
    assert_eq!(arrow.field(2).data_type(), &DataType::Float64);
    assert!(arrow.fields().iter().all(|f| f.is_nullable()));
}

#[test]
fn test_column_type_display() {
    assert_eq!(ColumnType::Timestamp.to_string(), "timestamp");
    assert_eq!(ColumnType::Integer.to_string(), "integer");
}
