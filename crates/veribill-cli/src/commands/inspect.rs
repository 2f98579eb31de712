//! Classification and marker debugging commands

use std::path::Path;

use anyhow::Result;
use veribill_core::{AnalysisEngine, Marker};

use super::load_bill;

/// Print the inferred property classification for a bill
pub fn cmd_classify(file: &Path) -> Result<()> {
    let bill = load_bill(file)?;
    let engine = AnalysisEngine::new()?;
    println!("{}", engine.classify(&bill));
    Ok(())
}

/// Print every statement-text marker and whether it matches the bill
pub fn cmd_markers(file: &Path) -> Result<()> {
    let bill = load_bill(file)?;
    let engine = AnalysisEngine::new()?;
    let markers = engine.markers();

    for marker in Marker::all() {
        let hit = markers.has(&bill.raw_text, *marker);
        if marker.is_numeric() {
            match markers.extract_number(&bill.raw_text, *marker) {
                Some(n) => println!("{:<22} yes ({})", marker.as_str(), n),
                None => println!("{:<22} no", marker.as_str()),
            }
        } else {
            println!("{:<22} {}", marker.as_str(), if hit { "yes" } else { "no" });
        }
    }
    Ok(())
}
