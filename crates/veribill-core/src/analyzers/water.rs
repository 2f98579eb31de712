//! Water analyzer
//!
//! Distinguishes demand-levy-only charges from metered consumption, and
//! flags daily averages consistent with a leak.

use crate::models::{format_rand, LineItemMetadata, PropertyClass, ServiceType};

use super::engine::{AnalysisContext, BillAnalyzer};
use super::types::{AnalyzerKind, Insight, Severity};

pub struct WaterAnalyzer;

impl WaterAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WaterAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BillAnalyzer for WaterAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::Water
    }

    fn name(&self) -> &'static str {
        "Water"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let Some(line) = ctx.line(ServiceType::Water) else {
            return vec![];
        };

        let consumption = line.quantity.or(match line.metadata {
            LineItemMetadata::Water { consumption_kl } => consumption_kl,
            _ => None,
        });
        let kl = consumption.unwrap_or(0.0);

        // A nonzero charge with no consumption is the fixed demand levy
        if kl <= 0.0 && line.amount_cents > 0 {
            return vec![Insight::new(
                self.id(),
                Severity::Info,
                "Water demand levy only",
                format!(
                    "No water consumption was metered this period; the {} charge \
                     is the fixed demand levy.",
                    format_rand(line.amount_cents)
                ),
            )];
        }
        if kl <= 0.0 {
            return vec![];
        }

        let mut insights = vec![];
        let daily = kl / ctx.billing_days();

        if ctx.classification == PropertyClass::Residential
            && daily > ctx.config.residential_daily_kl_limit
        {
            insights.push(
                Insight::new(
                    self.id(),
                    Severity::Attention,
                    "Possible water leak",
                    format!(
                        "Daily average of {:.2} kL is high for a residential property \
                         ({:.0} kL over the period).",
                        daily, kl
                    ),
                )
                .with_implication(
                    "Usage at this level often points to a leaking toilet, geyser \
                     overflow, or underground pipe leak.",
                )
                .with_action(
                    "Close all taps, check whether the meter still turns, and log a \
                     leak inspection if it does.",
                ),
            );
        }

        if let Some(units) = ctx
            .bill
            .property
            .as_ref()
            .and_then(|p| p.unit_count)
            .filter(|u| *u > 1)
        {
            let per_unit_daily = daily / units as f64;
            if per_unit_daily > ctx.config.per_unit_daily_kl_limit {
                insights.push(
                    Insight::new(
                        self.id(),
                        Severity::Attention,
                        "High per-unit water consumption",
                        format!(
                            "Across {} living units the daily average is {:.2} kL per \
                             unit.",
                            units, per_unit_daily
                        ),
                    )
                    .with_action("Check for leaks in common areas and individual units."),
                );
            }
        }

        insights
    }
}
