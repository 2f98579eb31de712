//! Tariff rule set commands

use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use veribill_core::ServiceType;

use super::load_store;

/// List the rules in a tariff rule set, flagging malformed pricing
pub fn cmd_tariffs(file: &Path, service: Option<&str>) -> Result<()> {
    let store = load_store(file)?;
    let filter = service
        .map(ServiceType::from_str)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let mut shown = 0;
    let mut malformed = 0;
    for rule in store.rules() {
        if filter.is_some_and(|s| rule.service != s) {
            continue;
        }
        shown += 1;
        let status = if !rule.active {
            "inactive"
        } else if rule.verified {
            "verified"
        } else {
            "unverified"
        };
        println!(
            "{:<20} {:<12} {:<12} {:<8} {} ({})",
            rule.id, rule.service, rule.category, rule.financial_year, status, rule.provider
        );
        if rule.pricing.is_malformed() {
            malformed += 1;
            println!("    WARNING: malformed pricing structure; the engine will skip this rule");
        }
    }

    println!();
    println!("{} rules shown, {} malformed", shown, malformed);
    Ok(())
}
