//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{
    parse_quote, parse_separator, ConvertConfig, EngineConfig, ExtractConfig, MemoryBudget,
    WarehouseConfig,
};
use crate::convert;
use crate::error::{Error, Result};
use crate::extract::{extract_and_explode, NullPolicy, Warehouse};
use crate::schema::SchemaRegistry;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Convert {
                input,
                output,
                sep,
                quote,
                no_quote,
                memory_limit,
                threads,
                pattern,
                schemas,
                lenient,
            } => {
                let mut engine = EngineConfig::default()
                    .with_memory_limit(memory_limit.parse::<MemoryBudget>()?);
                if let Some(threads) = threads {
                    engine = engine.with_threads(*threads);
                }

                let mut config = ConvertConfig::new(input, output)
                    .with_separator(parse_separator(sep)?)
                    .with_quote(if *no_quote { None } else { Some(parse_quote(quote)?) })
                    .with_pattern(pattern.clone())
                    .with_engine(engine);
                config.lenient = *lenient;

                self.convert(&config, schemas.as_deref())
            }
            Commands::Extract {
                output,
                source,
                query,
                list_column,
                delimiter,
                null_policy,
            } => {
                let mut config = ExtractConfig::new(output)
                    .with_list_column(list_column.clone())
                    .with_null_policy(*null_policy);
                config.delimiter.clone_from(delimiter);
                if let Some(query) = query {
                    config = config.with_query(query.clone());
                }

                self.extract(&config, source.as_deref())
            }
            Commands::Schemas { schemas } => self.schemas(schemas.as_deref()),
        }
    }

    /// Convert text tables to Parquet directories
    fn convert(&self, config: &ConvertConfig, schemas: Option<&Path>) -> Result<()> {
        let registry = load_registry(schemas)?;
        tracing::info!(
            input = %config.input_dir.display(),
            output = %config.output_dir.display(),
            tables = registry.len(),
            memory_limit = %config.engine.memory_limit,
            "Starting conversion"
        );

        let summary = convert::run(config, &registry)?;
        self.output(&summary)
    }

    /// Extract the exploded id mapping
    fn extract(&self, config: &ExtractConfig, source: Option<&Path>) -> Result<()> {
        config.validate()?;
        // Fail before opening a warehouse connection
        if config.destination.exists() {
            return Err(Error::destination_exists(&config.destination));
        }

        let warehouse = match source {
            Some(path) => Warehouse::open_local(path)?,
            None => Warehouse::connect(&WarehouseConfig::from_env()?)?,
        };
        tracing::info!(
            source = warehouse.description(),
            destination = %config.destination.display(),
            list_column = %config.list_column,
            null_policy = ?config.null_policy,
            "Starting extraction"
        );
        if config.null_policy == NullPolicy::Error {
            tracing::debug!("null list values will fail the extraction");
        }

        let summary = extract_and_explode(&warehouse, config)?;
        self.output(&summary)
    }

    /// List registry tables
    fn schemas(&self, schemas: Option<&Path>) -> Result<()> {
        let registry = load_registry(schemas)?;

        let tables: Vec<_> = registry
            .tables()
            .map(|table| {
                json!({
                    "name": table.name,
                    "description": table.description,
                    "columns": table.columns,
                })
            })
            .collect();

        self.output(&json!({ "tables": tables }))
    }

    /// Print a JSON document to stdout
    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{text}");
        Ok(())
    }
}

/// Load the registry from a file, or the built-in MAG registry
fn load_registry(path: Option<&Path>) -> Result<SchemaRegistry> {
    match path {
        Some(path) => {
            tracing::debug!("Loading schema registry from {}", path.display());
            SchemaRegistry::from_file(path)
        }
        None => SchemaRegistry::builtin(),
    }
}
