//! Refuse analyzer
//!
//! Business properties must have a waste-removal arrangement; the checks
//! here are informational nudges around that.

use crate::markers::Marker;
use crate::models::{format_rand, LineItemMetadata, PropertyClass, ServiceType};

use super::engine::{AnalysisContext, BillAnalyzer};
use super::types::{AnalyzerKind, Insight, Severity};

pub struct RefuseAnalyzer;

impl RefuseAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RefuseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BillAnalyzer for RefuseAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::Refuse
    }

    fn name(&self) -> &'static str {
        "Refuse"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        if ctx.classification != PropertyClass::Business {
            return vec![];
        }

        let Some(line) = ctx.line(ServiceType::Refuse) else {
            return vec![Insight::new(
                self.id(),
                Severity::Info,
                "No refuse charge on a business account",
                "The statement carries no refuse-removal charge for this business \
                 property.",
            )
            .with_action(
                "Verify a waste-removal arrangement exists (municipal or private); \
                 back-billing for an unregistered service is common.",
            )];
        };

        let bins = match line.metadata {
            LineItemMetadata::Refuse { bin_count } => bin_count,
            _ => None,
        }
        .or_else(|| ctx.number(Marker::BinCount).map(|n| n as u32))
        .unwrap_or(1);

        if bins >= ctx.config.refuse_bin_note_threshold {
            return vec![Insight::new(
                self.id(),
                Severity::Info,
                "Large refuse service",
                format!(
                    "This account is billed for a {}-bin refuse service at {} this \
                     period.",
                    bins,
                    format_rand(line.amount_cents)
                ),
            )
            .with_action("Confirm the bin count matches what is actually on site.")];
        }

        vec![]
    }
}
