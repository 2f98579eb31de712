//! Property rates analyzer
//!
//! Two checks around the CoJ rates policy: business-classified properties
//! get a business-vs-residential estimate (reclassification is the single
//! biggest saving available to mixed-use owners), and residential
//! properties above the exemption threshold are checked for the
//! first-R300 000 rebate line.
//!
//! The estimates use the published rate-in-the-rand factors and exist to
//! size the conversation with the municipality, not to re-derive the
//! bill's own arithmetic.

use crate::markers::Marker;
use crate::models::{format_rand, PropertyClass, ServiceType};

use super::engine::{AnalysisContext, BillAnalyzer};
use super::types::{AnalyzerKind, ImpactRange, Insight, Severity};

pub struct RatesAnalyzer;

impl RatesAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Estimated monthly rates at the business factor
    fn business_monthly_cents(ctx: &AnalysisContext<'_>, valuation_cents: i64) -> i64 {
        (valuation_cents as f64 * ctx.config.business_rate_factor / 12.0).round() as i64
    }

    /// Estimated monthly rates at the residential factor, after the
    /// first-R300 000 exemption
    fn residential_monthly_cents(ctx: &AnalysisContext<'_>, valuation_cents: i64) -> i64 {
        let taxable = (valuation_cents - ctx.config.residential_rates_exemption_cents).max(0);
        (taxable as f64 * ctx.config.residential_rate_factor / 12.0).round() as i64
    }
}

impl Default for RatesAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BillAnalyzer for RatesAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::Rates
    }

    fn name(&self) -> &'static str {
        "Property rates"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        if ctx.line(ServiceType::Rates).is_none() {
            return vec![];
        }
        let valuation = ctx
            .bill
            .property
            .as_ref()
            .and_then(|p| p.municipal_valuation_cents);

        match ctx.classification {
            PropertyClass::Business => {
                let Some(valuation) = valuation else {
                    return vec![];
                };
                let business = Self::business_monthly_cents(ctx, valuation);
                let residential = Self::residential_monthly_cents(ctx, valuation);
                let difference = business - residential;
                if difference <= ctx.config.rates_reclass_savings_threshold_cents {
                    return vec![];
                }
                vec![Insight::new(
                    self.id(),
                    Severity::Attention,
                    "Business rates tariff applied",
                    format!(
                        "At the business rate this property pays roughly {}/month; \
                         the same valuation billed residentially would be about \
                         {}/month.",
                        format_rand(business),
                        format_rand(residential)
                    ),
                )
                .with_implication(format!(
                    "If any part of the property is residential, reclassification \
                     could save around {}/month.",
                    format_rand(difference)
                ))
                .with_action(
                    "Check the zoning and usage on record and apply for \
                     reclassification if they are wrong.",
                )
                .with_savings(ImpactRange::exact(difference))]
            }
            PropertyClass::Residential => {
                let Some(valuation) = valuation else {
                    return vec![];
                };
                if valuation <= ctx.config.residential_rates_exemption_cents
                    || ctx.has(Marker::RatesRebate)
                {
                    return vec![];
                }
                vec![Insight::new(
                    self.id(),
                    Severity::ActionRequired,
                    "Missing residential rates rebate",
                    "The statement shows no deduction for the first R300 000 of the \
                     property valuation.",
                )
                .with_implication(format!(
                    "Residential properties are exempt from rates on the first \
                     R300 000; without it this account overpays about {} every \
                     month.",
                    format_rand(ctx.config.rebate_monthly_savings_cents)
                ))
                .with_action("Query the missing exemption with the rates department.")
                .with_savings(ImpactRange::exact(ctx.config.rebate_monthly_savings_cents))]
            }
            PropertyClass::Mixed | PropertyClass::Unknown => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::markers::MarkerSet;
    use crate::models::{LineItem, ParsedBill, PropertyInfo};

    fn analyze(bill: &ParsedBill, classification: PropertyClass) -> Vec<Insight> {
        let config = AnalysisConfig::default();
        let markers = MarkerSet::new().unwrap();
        let ctx = AnalysisContext::new(bill, classification, &config, &markers);
        RatesAnalyzer::new().analyze(&ctx)
    }

    fn rates_bill(valuation_cents: Option<i64>, raw_text: &str) -> ParsedBill {
        ParsedBill {
            line_items: vec![LineItem::new(ServiceType::Rates, "Rates", 150_000)],
            property: Some(PropertyInfo {
                municipal_valuation_cents: valuation_cents,
                ..Default::default()
            }),
            raw_text: raw_text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_business_reclassification_savings() {
        // R1 000 000 valuation: business ~R1 988.50/mo vs residential ~R556.77/mo
        let bill = rates_bill(Some(100_000_000), "");
        let insights = analyze(&bill, PropertyClass::Business);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Attention);
        let savings = insights[0].savings.unwrap();
        assert_eq!(savings.min_cents, savings.max_cents);
        assert_eq!(savings.max_cents, 198_850 - 55_677);
    }

    #[test]
    fn test_business_difference_monotone_in_valuation() {
        let mut previous = 0;
        for valuation in [40_000_000i64, 60_000_000, 100_000_000, 250_000_000] {
            let bill = rates_bill(Some(valuation), "");
            let insights = analyze(&bill, PropertyClass::Business);
            let savings = insights[0].savings.unwrap().max_cents;
            assert!(savings > previous, "difference must increase with valuation");
            previous = savings;
        }
    }

    #[test]
    fn test_business_small_difference_not_flagged() {
        // Tiny valuation: difference stays under R500/month
        let bill = rates_bill(Some(2_000_000), "");
        assert!(analyze(&bill, PropertyClass::Business).is_empty());
    }

    #[test]
    fn test_residential_missing_rebate_flagged() {
        // R500 000 valuation, no rebate line in the text
        let bill = rates_bill(Some(50_000_000), "Assessment rates monthly charge");
        let insights = analyze(&bill, PropertyClass::Residential);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::ActionRequired);
        assert_eq!(insights[0].savings.unwrap(), ImpactRange::exact(23862));
    }

    #[test]
    fn test_residential_rebate_present_not_flagged() {
        let bill = rates_bill(
            Some(50_000_000),
            "Less rates on first R300 000.00 of valuation",
        );
        assert!(analyze(&bill, PropertyClass::Residential).is_empty());
    }

    #[test]
    fn test_residential_below_exemption_not_flagged() {
        let bill = rates_bill(Some(25_000_000), "");
        assert!(analyze(&bill, PropertyClass::Residential).is_empty());
    }

    #[test]
    fn test_no_valuation_or_no_line_degrades_silently() {
        let bill = rates_bill(None, "");
        assert!(analyze(&bill, PropertyClass::Business).is_empty());
        assert!(analyze(&ParsedBill::default(), PropertyClass::Business).is_empty());
    }

    #[test]
    fn test_mixed_and_unknown_not_checked() {
        let bill = rates_bill(Some(100_000_000), "");
        assert!(analyze(&bill, PropertyClass::Mixed).is_empty());
        assert!(analyze(&bill, PropertyClass::Unknown).is_empty());
    }
}
