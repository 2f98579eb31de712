//! Veribill CLI - municipal bill verification
//!
//! Usage:
//!   veribill analyze --file bill.json --tariffs rules.json   Full pipeline + report
//!   veribill classify --file bill.json                       Property classification
//!   veribill verify --file bill.json --tariffs rules.json    Per-charge verification
//!   veribill markers --file bill.json                        Marker debugging
//!   veribill tariffs --file rules.json                       Rule set validation

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            tariffs,
            provider,
            json,
        } => commands::cmd_analyze(&file, tariffs.as_deref(), &provider, json),
        Commands::Classify { file } => commands::cmd_classify(&file),
        Commands::Verify {
            file,
            tariffs,
            provider,
        } => commands::cmd_verify(&file, &tariffs, &provider),
        Commands::Markers { file } => commands::cmd_markers(&file),
        Commands::Tariffs { file, service } => commands::cmd_tariffs(&file, service.as_deref()),
    }
}
