//! CLI module
//!
//! # Commands
//!
//! - `convert` - Convert MAG text tables to Parquet directories
//! - `extract` - Write the exploded paper/MAG id mapping to one Parquet file
//! - `schemas` - List the schema registry

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
