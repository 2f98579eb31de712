//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - full pipeline (classify, analyze, verify, report)
//! - `inspect` - classification and marker debugging commands
//! - `tariffs` - tariff rule set listing and validation

pub mod analyze;
pub mod inspect;
pub mod tariffs;

// Re-export command functions for main.rs
pub use analyze::*;
pub use inspect::*;
pub use tariffs::*;

use std::path::Path;

use anyhow::{Context, Result};
use veribill_core::{InMemoryTariffStore, ParsedBill};

/// Load a parsed bill from a JSON file
pub fn load_bill(path: &Path) -> Result<ParsedBill> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bill file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse bill file {}", path.display()))
}

/// Load a tariff rule set from a JSON file (an array of rules)
pub fn load_store(path: &Path) -> Result<InMemoryTariffStore> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tariff file {}", path.display()))?;
    InMemoryTariffStore::from_json(&json)
        .with_context(|| format!("Failed to parse tariff file {}", path.display()))
}
