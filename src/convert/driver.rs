//! Conversion driver
//!
//! Walks the input directory once, resolves each candidate file to a schema,
//! and converts the files whose output does not exist yet. Existing outputs
//! are treated as done, so re-running after an interruption only does the
//! remaining work.

use super::types::{
    destination_for, staging_for, ConversionJob, ConversionSummary, ConvertedTable,
    SUCCESS_MARKER,
};
use crate::config::ConvertConfig;
use crate::engine::{DelimitedOptions, TableEngine, TableStats};
use crate::error::{Error, Result, ResultExt};
use crate::schema::{key_for_path, SchemaRegistry};
use std::fs;
use std::path::{Path, PathBuf};

/// What to do with one candidate file
enum Plan<'a> {
    /// No schema for the file's key
    NoSchema,
    /// Destination already exists
    AlreadyDone(PathBuf),
    /// Convert it
    Convert(ConversionJob<'a>),
}

/// Directory-to-Parquet conversion driver
pub struct ConversionDriver<'a> {
    registry: &'a SchemaRegistry,
    config: &'a ConvertConfig,
}

impl<'a> ConversionDriver<'a> {
    /// Create a driver over a registry and run configuration
    pub fn new(registry: &'a SchemaRegistry, config: &'a ConvertConfig) -> Self {
        Self { registry, config }
    }

    /// Lazily enumerate candidate files in the input directory.
    ///
    /// Order follows the `glob` crate (sorted by path); correctness does not
    /// depend on it.
    pub fn candidates(&self) -> Result<glob::Paths> {
        let dir = self.config.input_dir.to_str().ok_or_else(|| {
            Error::config(format!(
                "Input directory is not valid UTF-8: {}",
                self.config.input_dir.display()
            ))
        })?;
        let pattern = format!("{}/{}", glob::Pattern::escape(dir), self.config.pattern);
        Ok(glob::glob(&pattern)?)
    }

    /// Convert every candidate file that has a schema and no output yet.
    ///
    /// The first read or write failure aborts the run. The counts gathered
    /// up to that point are logged with the error.
    pub fn run<E: TableEngine>(&self, engine: &mut E) -> Result<ConversionSummary> {
        let mut summary = ConversionSummary::default();

        if let Err(e) = self.run_into(engine, &mut summary) {
            tracing::error!(
                found = summary.files_found,
                converted = summary.converted_count(),
                skipped_no_schema = summary.skipped_no_schema.len(),
                skipped_existing = summary.skipped_existing.len(),
                "Conversion run aborted: {e}"
            );
            return Err(e);
        }

        tracing::info!(
            found = summary.files_found,
            converted = summary.converted_count(),
            skipped_no_schema = summary.skipped_no_schema.len(),
            skipped_existing = summary.skipped_existing.len(),
            "Conversion run complete"
        );

        Ok(summary)
    }

    /// Like [`run`](Self::run), recording progress into `summary` as it goes,
    /// so the caller keeps the partial counts when the run fails.
    pub fn run_into<E: TableEngine>(
        &self,
        engine: &mut E,
        summary: &mut ConversionSummary,
    ) -> Result<()> {
        self.ensure_output_dir()?;

        for entry in self.candidates()? {
            let source = entry.map_err(|e| Error::Io(e.into_error()))?;
            if !source.is_file() {
                continue;
            }
            summary.files_found += 1;

            match self.plan(&source) {
                Plan::NoSchema => {
                    tracing::debug!("schema not found for {}. skipping", source.display());
                    summary.skipped_no_schema.push(source);
                }
                Plan::AlreadyDone(destination) => {
                    tracing::debug!("{} already exists. skipping", destination.display());
                    summary.skipped_existing.push(source);
                }
                Plan::Convert(job) => {
                    let stats = self.execute(engine, &job)?;
                    summary.converted.push(ConvertedTable::new(&job, stats));
                }
            }
        }

        Ok(())
    }

    fn ensure_output_dir(&self) -> Result<()> {
        let dir = &self.config.output_dir;
        if !dir.exists() {
            tracing::debug!("creating output base directory: {}", dir.display());
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    fn plan(&self, source: &Path) -> Plan<'a> {
        let registry: &'a SchemaRegistry = self.registry;

        let Some(schema) = key_for_path(source).and_then(|key| registry.resolve(key)) else {
            return Plan::NoSchema;
        };

        let destination = destination_for(&self.config.output_dir, &schema.name);
        if destination.exists() {
            return Plan::AlreadyDone(destination);
        }

        Plan::Convert(ConversionJob {
            source_path: source.to_path_buf(),
            schema,
            destination_path: destination,
        })
    }

    /// Convert one file into a staging directory and move it into place.
    ///
    /// The destination only appears once the write has fully succeeded.
    fn execute<E: TableEngine>(&self, engine: &mut E, job: &ConversionJob<'_>) -> Result<TableStats> {
        let staging = staging_for(&self.config.output_dir, &job.schema.name);
        if staging.exists() {
            tracing::warn!("Removing stale staging directory {}", staging.display());
            fs::remove_dir_all(&staging)
                .with_context(|| format!("Failed to remove {}", staging.display()))?;
        }
        fs::create_dir(&staging).with_context(|| format!("Failed to create {}", staging.display()))?;

        tracing::debug!(
            "reading file {}",
            fs::canonicalize(&job.source_path)
                .unwrap_or_else(|_| job.source_path.clone())
                .display()
        );
        tracing::debug!("schema: {:?}", job.schema.column_names());
        tracing::debug!("saving to parquet: {}", job.destination_path.display());

        let options = DelimitedOptions::from(self.config);
        let written = engine
            .convert(&job.source_path, job.schema, &options, &staging)
            .and_then(|stats| {
                fs::File::create(staging.join(SUCCESS_MARKER))?;
                fs::rename(&staging, &job.destination_path)?;
                Ok(stats)
            });

        let stats = match written {
            Ok(stats) => stats,
            Err(e) => {
                discard_staging(&staging);
                return Err(e);
            }
        };

        tracing::debug!("done saving to {}", job.destination_path.display());
        tracing::debug!("number of columns: {}", stats.columns);
        tracing::debug!("number of rows: {}", stats.rows);
        tracing::debug!("-----------------------------");
        tracing::info!(key = %job.schema.name, rows = stats.rows, "Converted {}", job.source_path.display());

        Ok(stats)
    }
}

fn discard_staging(staging: &Path) {
    if staging.exists() {
        if let Err(e) = fs::remove_dir_all(staging) {
            tracing::warn!("Failed to remove staging directory {}: {e}", staging.display());
        }
    }
}
