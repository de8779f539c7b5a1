//! CLI commands and argument parsing

use crate::config::{DEFAULT_LIST_COLUMN, DEFAULT_LIST_DELIMITER, DEFAULT_MEMORY_LIMIT, DEFAULT_PATTERN};
use crate::extract::NullPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MAG text tables to Parquet, plus S2/MAG id extraction
#[derive(Parser, Debug)]
#[command(name = "mag-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Debug-level logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Summary output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a directory of MAG text tables to Parquet
    Convert {
        /// Directory of input text tables
        input: PathBuf,

        /// Directory for Parquet outputs
        output: PathBuf,

        /// Field separator (`\t` or `tab` for tab)
        #[arg(long, default_value = "\\t")]
        sep: String,

        /// Quote character
        #[arg(long, default_value = "\"", conflicts_with = "no_quote")]
        quote: String,

        /// Read quote characters as ordinary text
        #[arg(long)]
        no_quote: bool,

        /// Engine memory budget, e.g. 100g or 512m
        #[arg(long, alias = "spark-mem", default_value = DEFAULT_MEMORY_LIMIT)]
        memory_limit: String,

        /// Engine worker threads (default: all cores)
        #[arg(long)]
        threads: Option<usize>,

        /// Candidate file name pattern
        #[arg(long, default_value = DEFAULT_PATTERN)]
        pattern: String,

        /// Schema registry YAML replacing the built-in one
        #[arg(long)]
        schemas: Option<PathBuf>,

        /// Skip malformed rows instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Extract the paper/MAG id mapping into one Parquet file
    Extract {
        /// Destination Parquet file (must not exist)
        output: PathBuf,

        /// Local DuckDB file to query instead of the warehouse
        #[arg(long)]
        source: Option<PathBuf>,

        /// Query to run instead of the fixed id-mapping query
        #[arg(long)]
        query: Option<String>,

        /// Column holding delimiter-separated ids
        #[arg(long, default_value = DEFAULT_LIST_COLUMN)]
        list_column: String,

        /// Delimiter inside the list column
        #[arg(long, default_value = DEFAULT_LIST_DELIMITER)]
        delimiter: String,

        /// How null list values are handled
        #[arg(long, value_enum, default_value_t = NullPolicy::Passthrough)]
        null_policy: NullPolicy,
    },

    /// List the tables in the schema registry
    Schemas {
        /// Schema registry YAML replacing the built-in one
        #[arg(long)]
        schemas: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Indented JSON
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_defaults() {
        let cli = Cli::try_parse_from(["mag-etl", "convert", "in", "out"]).unwrap();
        assert!(!cli.debug);
        match cli.command {
            Commands::Convert {
                sep,
                memory_limit,
                pattern,
                lenient,
                quote,
                no_quote,
                ..
            } => {
                assert_eq!(sep, "\\t");
                assert_eq!(quote, "\"");
                assert!(!no_quote);
                assert_eq!(memory_limit, "100g");
                assert_eq!(pattern, "*.txt*");
                assert!(!lenient);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_spark_mem_alias() {
        let cli = Cli::try_parse_from([
            "mag-etl",
            "convert",
            "in",
            "out",
            "--spark-mem",
            "8g",
            "--debug",
        ])
        .unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Convert { ref memory_limit, .. } if memory_limit == "8g"));
    }

    #[test]
    fn test_quote_flags() {
        let cli = Cli::try_parse_from(["mag-etl", "convert", "in", "out", "--no-quote"]).unwrap();
        assert!(matches!(cli.command, Commands::Convert { no_quote: true, .. }));

        let cli = Cli::try_parse_from(["mag-etl", "convert", "in", "out", "--quote", "'"]).unwrap();
        assert!(matches!(cli.command, Commands::Convert { ref quote, no_quote: false, .. } if quote == "'"));

        let both = Cli::try_parse_from([
            "mag-etl", "convert", "in", "out", "--quote", "'", "--no-quote",
        ]);
        assert!(both.is_err());
    }

    #[test]
    fn test_extract_null_policy() {
        let cli = Cli::try_parse_from(["mag-etl", "extract", "ids.parquet", "--null-policy", "drop"])
            .unwrap();
        match cli.command {
            Commands::Extract {
                null_policy,
                list_column,
                delimiter,
                ..
            } => {
                assert_eq!(null_policy, NullPolicy::Drop);
                assert_eq!(list_column, "mag_id");
                assert_eq!(delimiter, ",");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
