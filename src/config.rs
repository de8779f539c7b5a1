//! Run configuration
//!
//! Every component receives one of these structs explicitly; nothing reads
//! ambient global state after the CLI runner has built them.

use crate::error::{Error, Result};
use crate::extract::NullPolicy;
use crate::output::ParquetWriterConfig;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default field separator for MAG table files
pub const DEFAULT_SEPARATOR: char = '\t';

/// Default engine memory budget
pub const DEFAULT_MEMORY_LIMIT: &str = "100g";

/// Default candidate file pattern
pub const DEFAULT_PATTERN: &str = "*.txt*";

/// Environment variable prefix for warehouse credentials
pub const WAREHOUSE_ENV_PREFIX: &str = "S2_REDSHIFT_DEV_";

/// Default warehouse port (Redshift)
pub const DEFAULT_WAREHOUSE_PORT: u16 = 5439;

// ============================================================================
// Memory Budget
// ============================================================================

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;
const TIB: u64 = GIB * 1024;

/// Memory budget for the compute engine, parsed from Spark-style size strings
/// such as `100g` or `512m`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBudget {
    bytes: u64,
}

impl MemoryBudget {
    /// Create a budget from a byte count
    pub fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    /// Budget in bytes
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Render as a DuckDB `memory_limit` value using the largest exact binary unit
    pub fn to_duckdb_setting(&self) -> String {
        let b = self.bytes;
        if b != 0 && b % TIB == 0 {
            format!("{}TiB", b / TIB)
        } else if b != 0 && b % GIB == 0 {
            format!("{}GiB", b / GIB)
        } else if b != 0 && b % MIB == 0 {
            format!("{}MiB", b / MIB)
        } else if b != 0 && b % KIB == 0 {
            format!("{}KiB", b / KIB)
        } else {
            format!("{b}B")
        }
    }
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self { bytes: 100 * GIB }
    }
}

impl FromStr for MemoryBudget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let invalid = || Error::invalid_value("memory_limit", format!("cannot parse '{s}'"));

        let digits_end = lower
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(lower.len());
        let (number, unit) = lower.split_at(digits_end);
        if number.is_empty() {
            return Err(invalid());
        }
        let number: u64 = number.parse().map_err(|_| invalid())?;

        let unit = unit.trim();
        let unit = unit.strip_suffix('b').unwrap_or(unit);
        let multiplier = match unit {
            "" => 1,
            "k" => KIB,
            "m" => MIB,
            "g" => GIB,
            "t" => TIB,
            _ => return Err(invalid()),
        };

        let bytes = number.checked_mul(multiplier).ok_or_else(invalid)?;
        if bytes == 0 {
            return Err(Error::invalid_value(
                "memory_limit",
                "memory limit must be greater than zero",
            ));
        }
        Ok(Self { bytes })
    }
}

impl fmt::Display for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bytes;
        if b % TIB == 0 {
            write!(f, "{}t", b / TIB)
        } else if b % GIB == 0 {
            write!(f, "{}g", b / GIB)
        } else if b % MIB == 0 {
            write!(f, "{}m", b / MIB)
        } else if b % KIB == 0 {
            write!(f, "{}k", b / KIB)
        } else {
            write!(f, "{b}")
        }
    }
}

// ============================================================================
// Separator
// ============================================================================

/// Parse a field separator given on the command line.
///
/// Accepts a single character, the escape `\t`, or the word `tab`.
pub fn parse_separator(s: &str) -> Result<char> {
    if s == "\\t" || s.eq_ignore_ascii_case("tab") {
        return Ok('\t');
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            validate_separator(c)?;
            Ok(c)
        }
        _ => Err(Error::invalid_value(
            "sep",
            format!("separator must be a single character, got '{s}'"),
        )),
    }
}

/// Parse a quote character given on the command line
pub fn parse_quote(s: &str) -> Result<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            validate_quote(c)?;
            Ok(c)
        }
        _ => Err(Error::invalid_value(
            "quote",
            format!("quote must be a single character, got '{s}'"),
        )),
    }
}

fn validate_quote(c: char) -> Result<()> {
    if !c.is_ascii() || c == '\n' || c == '\r' {
        return Err(Error::invalid_value("quote", format!("unsupported quote {c:?}")));
    }
    Ok(())
}

fn validate_separator(c: char) -> Result<()> {
    if !c.is_ascii() || c == '\n' || c == '\r' || c == '"' {
        return Err(Error::invalid_value(
            "sep",
            format!("unsupported separator {c:?}"),
        ));
    }
    Ok(())
}

// ============================================================================
// Engine Config
// ============================================================================

/// Settings for the compute engine session
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Memory budget
    pub memory_limit: MemoryBudget,
    /// Worker threads (engine default when unset)
    pub threads: Option<usize>,
    /// Spill directory for out-of-core work
    pub temp_directory: Option<PathBuf>,
}

impl EngineConfig {
    /// Set the memory budget
    #[must_use]
    pub fn with_memory_limit(mut self, memory_limit: MemoryBudget) -> Self {
        self.memory_limit = memory_limit;
        self
    }

    /// Set the worker thread count
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

// ============================================================================
// Conversion Config
// ============================================================================

/// Configuration for one run of the conversion driver
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Directory of delimited text tables
    pub input_dir: PathBuf,
    /// Base directory for Parquet outputs
    pub output_dir: PathBuf,
    /// Field separator
    pub separator: char,
    /// Quote character (`None` disables quoting)
    pub quote: Option<char>,
    /// Glob pattern for candidate files, relative to `input_dir`
    pub pattern: String,
    /// Skip rows that cannot be coerced to the schema instead of failing
    pub lenient: bool,
    /// Engine settings
    pub engine: EngineConfig,
}

impl ConvertConfig {
    /// Create a config with default settings
    pub fn new(input_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            separator: DEFAULT_SEPARATOR,
            quote: Some('"'),
            pattern: DEFAULT_PATTERN.to_string(),
            lenient: false,
            engine: EngineConfig::default(),
        }
    }

    /// Set the field separator
    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Set the quote character; `None` reads quotes as ordinary text
    #[must_use]
    pub fn with_quote(mut self, quote: Option<char>) -> Self {
        self.quote = quote;
        self
    }

    /// Set the candidate file pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the engine settings
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Validate directories and separator
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.is_dir() {
            return Err(Error::config(format!(
                "Input directory does not exist or is not a directory: {}",
                self.input_dir.display()
            )));
        }
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(Error::config(format!(
                "Output path exists and is not a directory: {}",
                self.output_dir.display()
            )));
        }
        validate_separator(self.separator)?;
        if let Some(quote) = self.quote {
            validate_quote(quote)?;
        }
        if self.quote == Some(self.separator) {
            return Err(Error::invalid_value(
                "quote",
                "quote character cannot equal the separator",
            ));
        }
        if self.pattern.contains('/') || self.pattern.contains('\\') {
            return Err(Error::invalid_value(
                "pattern",
                "pattern must match file names, not paths",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Warehouse Config
// ============================================================================

/// Connection parameters for the relational warehouse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl WarehouseConfig {
    /// Build from `S2_REDSHIFT_DEV_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |suffix: &str| {
            let name = format!("{WAREHOUSE_ENV_PREFIX}{suffix}");
            lookup(&name).ok_or_else(|| Error::missing_field(name))
        };

        let port_var = format!("{WAREHOUSE_ENV_PREFIX}PORT");
        let port = match lookup(&port_var) {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| Error::invalid_value(&port_var, format!("not a port: '{p}'")))?,
            None => DEFAULT_WAREHOUSE_PORT,
        };

        Ok(Self {
            host: required("HOST")?,
            port,
            database: required("DBNAME")?,
            user: required("LOGIN")?,
            password: required("PASSWORD")?,
        })
    }

    /// PostgreSQL connection URI
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }

    /// Connection URI with the password masked, for logs
    pub fn masked_connection_string(&self) -> String {
        format!(
            "postgresql://{}:****@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

// ============================================================================
// Extraction Config
// ============================================================================

/// The fixed id-mapping query
pub const DEFAULT_QUERY: &str = "SELECT paper_sha, corpus_paper_id, fields_of_study, mag_id \
     FROM content.raw_papers rp WHERE mag_id IS NOT NULL";

/// Multi-valued column exploded by default
pub const DEFAULT_LIST_COLUMN: &str = "mag_id";

/// Default list delimiter
pub const DEFAULT_LIST_DELIMITER: &str = ",";

/// Configuration for the extraction step
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Output Parquet file
    pub destination: PathBuf,
    /// Query to run
    pub query: String,
    /// Column holding delimiter-separated values
    pub list_column: String,
    /// Delimiter inside the list column
    pub delimiter: String,
    /// How to treat null list values
    pub null_policy: NullPolicy,
    /// Parquet writer settings
    pub writer: ParquetWriterConfig,
}

impl ExtractConfig {
    /// Create a config with the fixed query and defaults
    pub fn new(destination: impl AsRef<Path>) -> Self {
        Self {
            destination: destination.as_ref().to_path_buf(),
            query: DEFAULT_QUERY.to_string(),
            list_column: DEFAULT_LIST_COLUMN.to_string(),
            delimiter: DEFAULT_LIST_DELIMITER.to_string(),
            null_policy: NullPolicy::default(),
            writer: ParquetWriterConfig::default(),
        }
    }

    /// Override the query
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Override the list column
    #[must_use]
    pub fn with_list_column(mut self, column: impl Into<String>) -> Self {
        self.list_column = column.into();
        self
    }

    /// Override the null policy
    #[must_use]
    pub fn with_null_policy(mut self, policy: NullPolicy) -> Self {
        self.null_policy = policy;
        self
    }

    /// Validate settings that do not depend on the query result
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(Error::invalid_value("delimiter", "delimiter cannot be empty"));
        }
        if self.list_column.is_empty() {
            return Err(Error::invalid_value(
                "list_column",
                "list column cannot be empty",
            ));
        }
        if self.query.trim().is_empty() {
            return Err(Error::invalid_value("query", "query cannot be empty"));
        }
        Ok(())
    }
}
