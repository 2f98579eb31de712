//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Veribill - check municipal utility statements against official tariffs
#[derive(Parser)]
#[command(name = "veribill")]
#[command(about = "Municipal bill verification tool", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full analysis pipeline over a parsed bill
    Analyze {
        /// Parsed bill JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Tariff rule set JSON file (enables charge verification)
        #[arg(short, long)]
        tariffs: Option<PathBuf>,

        /// Billing provider to match tariff rules against
        #[arg(long, default_value = "City of Johannesburg")]
        provider: String,

        /// Emit the analysis as JSON instead of a plain-text report
        #[arg(long)]
        json: bool,
    },

    /// Classify the property on a parsed bill
    Classify {
        /// Parsed bill JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Verify each charge on a parsed bill against a tariff rule set
    Verify {
        /// Parsed bill JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Tariff rule set JSON file
        #[arg(short, long)]
        tariffs: PathBuf,

        /// Billing provider to match tariff rules against
        #[arg(long, default_value = "City of Johannesburg")]
        provider: String,
    },

    /// Show which statement-text markers match a parsed bill
    Markers {
        /// Parsed bill JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List and validate a tariff rule set
    Tariffs {
        /// Tariff rule set JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Only show rules for one service (e.g. electricity, water)
        #[arg(short, long)]
        service: Option<String>,
    },
}
