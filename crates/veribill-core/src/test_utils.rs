//! Fixture builders for tests
//!
//! Small constructors for the bill and tariff shapes the tests use over
//! and over. Enabled for this crate's own tests and, behind the
//! `test-utils` feature, for downstream integration tests.

use chrono::NaiveDate;

use crate::models::{LineItem, ParsedBill, PropertyInfo, ServiceType};
use crate::tariff::{Band, CustomerCategory, PricingStructure, TariffRule};

/// A bill dated 1 August 2025 (financial year 2025/26) with no line items
pub fn empty_bill() -> ParsedBill {
    ParsedBill {
        account_number: Some("550012345".to_string()),
        bill_date: NaiveDate::from_ymd_opt(2025, 8, 1),
        ..Default::default()
    }
}

/// `empty_bill` carrying the given line items
pub fn bill_with(line_items: Vec<LineItem>) -> ParsedBill {
    ParsedBill {
        line_items,
        ..empty_bill()
    }
}

/// Property info carrying only a municipal valuation
pub fn property_valued_at(valuation_cents: i64) -> PropertyInfo {
    PropertyInfo {
        municipal_valuation_cents: Some(valuation_cents),
        ..Default::default()
    }
}

pub fn band(lower: f64, upper: Option<f64>, rate_cents: f64) -> Band {
    Band {
        lower,
        upper,
        rate_cents: Some(rate_cents),
    }
}

/// A verified electricity tariff rule for the 2025/26 financial year
pub fn electricity_rule(
    id: &str,
    category: CustomerCategory,
    bands: Vec<Band>,
) -> TariffRule {
    TariffRule {
        id: id.to_string(),
        provider: "City of Johannesburg".to_string(),
        service: ServiceType::Electricity,
        tariff_code: Some("A1".to_string()),
        category,
        pricing: PricingStructure::EnergyBands { bands },
        vat_rate: 0.15,
        vat_inclusive: false,
        effective_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        expiry_date: NaiveDate::from_ymd_opt(2026, 6, 30),
        financial_year: "2025/26".to_string(),
        source_document: "CoJ Electricity Tariff Schedule 2025/26".to_string(),
        source_excerpt: "Block 1 (0-350 kWh): 200c/kWh".to_string(),
        source_page: Some(4),
        extraction_confidence: 0.9,
        verified: true,
        active: true,
    }
}

/// A verified water tariff rule for the 2025/26 financial year
pub fn water_rule(id: &str, category: CustomerCategory, bands: Vec<Band>) -> TariffRule {
    TariffRule {
        id: id.to_string(),
        provider: "City of Johannesburg".to_string(),
        service: ServiceType::Water,
        tariff_code: None,
        category,
        pricing: PricingStructure::ConsumptionBands { bands },
        vat_rate: 0.15,
        vat_inclusive: false,
        effective_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        expiry_date: NaiveDate::from_ymd_opt(2026, 6, 30),
        financial_year: "2025/26".to_string(),
        source_document: "CoJ Water Tariff Schedule 2025/26".to_string(),
        source_excerpt: "0-6 kL free basic water".to_string(),
        source_page: Some(2),
        extraction_confidence: 0.9,
        verified: true,
        active: true,
    }
}
