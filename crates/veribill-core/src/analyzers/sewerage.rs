//! Sewerage analyzer
//!
//! Purely informational: reports which billing method the statement uses
//! (stand size vs per living unit) so the account holder can sanity-check
//! the recorded property details. Never escalates above info.

use crate::markers::Marker;
use crate::models::{LineItemMetadata, ServiceType};

use super::engine::{AnalysisContext, BillAnalyzer};
use super::types::{AnalyzerKind, Insight, Severity};

pub struct SewerageAnalyzer;

impl SewerageAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SewerageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BillAnalyzer for SewerageAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::Sewerage
    }

    fn name(&self) -> &'static str {
        "Sewerage"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let Some(line) = ctx.line(ServiceType::Sewerage) else {
            return vec![];
        };

        let method = if ctx.has(Marker::SewerageStandSize) {
            Some("the stand size")
        } else if ctx.has(Marker::SeweragePerUnit) {
            Some("the number of living units")
        } else {
            None
        };
        let Some(method) = method else {
            return vec![];
        };

        let units = match line.metadata {
            LineItemMetadata::Sewerage { living_units } => living_units,
            _ => None,
        }
        .or_else(|| ctx.bill.property.as_ref().and_then(|p| p.unit_count));

        let finding = match units {
            Some(units) => format!(
                "Sewerage is billed on {} ({} living units recorded).",
                method, units
            ),
            None => format!("Sewerage is billed on {}.", method),
        };

        vec![Insight::new(
            self.id(),
            Severity::Info,
            "Sewerage billing method",
            finding,
        )
        .with_action(
            "Confirm the recorded property details are correct; the charge scales \
             with them.",
        )]
    }
}
