//! Electricity analyzer
//!
//! Flags estimated readings, abnormally high daily consumption on
//! residential properties, and multi-meter setups.

use crate::markers::Marker;
use crate::models::{format_rand, LineItemMetadata, MeterReading, PropertyClass, ReadingKind, ServiceType};

use super::engine::{AnalysisContext, BillAnalyzer};
use super::types::{AnalyzerKind, Insight, Severity};

pub struct ElectricityAnalyzer;

impl ElectricityAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ElectricityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BillAnalyzer for ElectricityAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::Electricity
    }

    fn name(&self) -> &'static str {
        "Electricity"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let Some(line) = ctx.line(ServiceType::Electricity) else {
            return vec![];
        };
        let mut insights = vec![];

        let meters: &[MeterReading] = match &line.metadata {
            LineItemMetadata::Electricity { meters } => meters,
            _ => &[],
        };

        let estimated = line.is_estimated
            || meters
                .iter()
                .any(|m| m.reading_kind == Some(ReadingKind::Estimated))
            || ctx.has(Marker::EstimatedReading);
        if estimated {
            insights.push(
                Insight::new(
                    self.id(),
                    Severity::ActionRequired,
                    "Estimated electricity reading",
                    "This electricity charge is based on an estimated meter reading, \
                     not an actual one.",
                )
                .with_implication(
                    "Estimates can run well above actual consumption and only correct \
                     after a physical reading, months later.",
                )
                .with_action(
                    "Submit an actual meter reading to the municipality and ask for \
                     the charge to be rebilled.",
                ),
            );
        }

        // Consumption: the line's quantity, else summed meter consumption
        let consumption = line.quantity.or_else(|| {
            let total: f64 = meters.iter().filter_map(|m| m.consumption).sum();
            (total > 0.0).then_some(total)
        });

        if let Some(kwh) = consumption {
            let daily = kwh / ctx.billing_days();
            if ctx.classification == PropertyClass::Residential
                && daily > ctx.config.residential_daily_kwh_limit
            {
                insights.push(
                    Insight::new(
                        self.id(),
                        Severity::Attention,
                        "High electricity consumption",
                        format!(
                            "Daily average of {:.1} kWh is unusually high for a \
                             residential property ({} charged for {:.0} kWh).",
                            daily,
                            format_rand(line.amount_cents),
                            kwh
                        ),
                    )
                    .with_implication(
                        "Sustained high usage can indicate a faulty appliance, \
                         geyser element, or metering problem.",
                    )
                    .with_action("Compare against the physical meter and recent months."),
                );
            }
        }

        if meters.len() > 1 {
            insights.push(Insight::new(
                self.id(),
                Severity::Info,
                "Multiple electricity meters",
                format!(
                    "This property is billed across {} electricity meters.",
                    meters.len()
                ),
            ));
        }

        insights
    }
}
