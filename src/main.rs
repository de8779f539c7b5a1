// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]

//! mag-etl CLI

use clap::Parser;
use mag_etl::cli::{Cli, Runner};
use std::time::Instant;
use tracing::Level;

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let started = Instant::now();
    tracing::info!("argv: {:?}", std::env::args().collect::<Vec<_>>());
    tracing::info!("start time: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    tracing::info!("pid: {}", std::process::id());

    let runner = Runner::new(cli);
    if let Err(e) = runner.run() {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    tracing::info!("total time: {:.3}s", started.elapsed().as_secs_f64());
}
