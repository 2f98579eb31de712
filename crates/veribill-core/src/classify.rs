//! Property classification
//!
//! Infers whether a statement belongs to a residential, business, or mixed
//! property. Several downstream analyzers consult the result, so this runs
//! before any of them. Pure function of bill content, no I/O.

use crate::config::AnalysisConfig;
use crate::markers::{Marker, MarkerSet};
use crate::models::{LineItemMetadata, ParsedBill, PropertyClass, ServiceType};

/// Classify the property on a statement.
///
/// Priority order, first match wins:
/// 1. both business and residential rates markers present -> mixed
/// 2. only one of the two markers present -> that class
/// 3. rate-in-the-rand on the rates line item, thresholded
/// 4. unknown
pub fn classify(bill: &ParsedBill, markers: &MarkerSet, config: &AnalysisConfig) -> PropertyClass {
    let business = markers.has(&bill.raw_text, Marker::BusinessRates);
    let residential = markers.has(&bill.raw_text, Marker::ResidentialRates);

    match (business, residential) {
        (true, true) => return PropertyClass::Mixed,
        (true, false) => return PropertyClass::Business,
        (false, true) => return PropertyClass::Residential,
        (false, false) => {}
    }

    if let Some(rate_used) = rates_rate_used(bill) {
        if rate_used > config.business_rate_used_threshold {
            return PropertyClass::Business;
        }
        return PropertyClass::Residential;
    }

    PropertyClass::Unknown
}

fn rates_rate_used(bill: &ParsedBill) -> Option<f64> {
    bill.line_items_for(ServiceType::Rates).find_map(|li| {
        match li.metadata {
            LineItemMetadata::Rates { rate_used } => rate_used,
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;

    fn setup() -> (MarkerSet, AnalysisConfig) {
        (MarkerSet::new().unwrap(), AnalysisConfig::default())
    }

    fn bill_with_text(text: &str) -> ParsedBill {
        ParsedBill {
            raw_text: text.to_string(),
            ..Default::default()
        }
    }

    fn bill_with_rate_used(rate: f64) -> ParsedBill {
        ParsedBill {
            line_items: vec![LineItem::new(ServiceType::Rates, "Rates", 100_000)
                .with_metadata(LineItemMetadata::Rates {
                    rate_used: Some(rate),
                })],
            ..Default::default()
        }
    }

    #[test]
    fn test_both_markers_means_mixed() {
        let (markers, config) = setup();
        let bill = bill_with_text("Business rates R500\nResidential rates R200");
        assert_eq!(classify(&bill, &markers, &config), PropertyClass::Mixed);
    }

    #[test]
    fn test_single_marker_wins() {
        let (markers, config) = setup();
        assert_eq!(
            classify(&bill_with_text("Rates: Business"), &markers, &config),
            PropertyClass::Business
        );
        assert_eq!(
            classify(&bill_with_text("Rates: Residential"), &markers, &config),
            PropertyClass::Residential
        );
    }

    #[test]
    fn test_marker_outranks_rate_used() {
        let (markers, config) = setup();
        // Text says residential even though the rate looks like business
        let mut bill = bill_with_rate_used(0.024);
        bill.raw_text = "Residential rates".to_string();
        assert_eq!(classify(&bill, &markers, &config), PropertyClass::Residential);
    }

    #[test]
    fn test_rate_used_threshold_fallback() {
        let (markers, config) = setup();
        assert_eq!(
            classify(&bill_with_rate_used(0.0238620), &markers, &config),
            PropertyClass::Business
        );
        assert_eq!(
            classify(&bill_with_rate_used(0.0095447), &markers, &config),
            PropertyClass::Residential
        );
        // Exactly at the threshold reads as residential
        assert_eq!(
            classify(&bill_with_rate_used(0.015), &markers, &config),
            PropertyClass::Residential
        );
    }

    #[test]
    fn test_empty_bill_is_unknown() {
        let (markers, config) = setup();
        assert_eq!(
            classify(&ParsedBill::default(), &markers, &config),
            PropertyClass::Unknown
        );
    }
}
