//! Analyze and verify command implementations

use std::path::Path;

use anyhow::Result;
use veribill_core::{
    format_rand, report, AnalysisEngine, Citation, VerificationEngine,
};

use super::{load_bill, load_store};

/// Run the full analysis pipeline and print the report (or JSON)
pub fn cmd_analyze(
    file: &Path,
    tariffs: Option<&Path>,
    provider: &str,
    json: bool,
) -> Result<()> {
    let bill = load_bill(file)?;
    tracing::debug!(line_items = bill.line_items.len(), "Loaded parsed bill");
    let engine = AnalysisEngine::new()?;

    let analysis = match tariffs {
        Some(tariffs) => {
            let store = load_store(tariffs)?;
            let verifier = VerificationEngine::new(&store, provider);
            engine.analyze_with_verification(&bill, &verifier)
        }
        None => engine.analyze(&bill),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", report::render(&analysis));
    }
    Ok(())
}

/// Verify each charge against the tariff rule set and print the outcomes
pub fn cmd_verify(file: &Path, tariffs: &Path, provider: &str) -> Result<()> {
    let bill = load_bill(file)?;
    let store = load_store(tariffs)?;
    let engine = AnalysisEngine::new()?;
    let verifier = VerificationEngine::new(&store, provider);

    let classification = engine.classify(&bill);
    let verifications = verifier.verify_bill(&bill, classification);

    if verifications.is_empty() {
        println!("No verifiable charges on this bill.");
        return Ok(());
    }

    println!("Classification: {}", classification);
    for v in &verifications {
        println!(
            "[{}] {} ({}, billed {})",
            v.result.status,
            v.description,
            v.service,
            format_rand(v.billed_cents)
        );
        match &v.result.citation {
            Citation::Sourced { document, .. } => {
                if let Some(computed) = v.result.computed_cents {
                    println!("    tariff amount {}", format_rand(computed));
                }
                if let Some(impact) = v.result.impact {
                    println!(
                        "    estimated impact {} to {}",
                        format_rand(impact.min_cents),
                        format_rand(impact.max_cents)
                    );
                }
                println!("    source: {} (confidence {:.2})", document, v.result.confidence);
            }
            Citation::Unsourced { reason } => println!("    reason: {}", reason),
        }
    }
    Ok(())
}
