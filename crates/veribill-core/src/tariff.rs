//! Tariff knowledge store
//!
//! Tariff rules are official, dated pricing definitions extracted from
//! municipal tariff schedules. The store is an external collaborator: the
//! engine only ever reads it, through the [`TariffStore`] trait, so tests
//! and the CLI substitute an in-memory fixture.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{PropertyClass, ServiceType};

/// Customer category a tariff rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerCategory {
    Residential,
    Business,
    /// Bulk supply (body corporates, large consumers)
    Bulk,
}

impl CustomerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Business => "business",
            Self::Bulk => "bulk",
        }
    }

    /// The category an inferred property classification maps onto exactly.
    /// Mixed and unknown properties map onto none, so ambiguous rule sets
    /// for them stay unresolved rather than guessed.
    pub fn for_class(class: PropertyClass) -> Option<Self> {
        match class {
            PropertyClass::Residential => Some(Self::Residential),
            PropertyClass::Business => Some(Self::Business),
            PropertyClass::Mixed | PropertyClass::Unknown => None,
        }
    }
}

impl std::str::FromStr for CustomerCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "residential" => Ok(Self::Residential),
            "business" | "commercial" => Ok(Self::Business),
            "bulk" => Ok(Self::Bulk),
            _ => Err(format!("Unknown customer category: {}", s)),
        }
    }
}

impl std::fmt::Display for CustomerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One consumption range within a banded pricing structure.
///
/// Bands use `[lower, upper)` semantics; the last band leaves `upper`
/// unset and is unbounded. A band without a rate marks the whole rule
/// malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: f64,
    #[serde(default)]
    pub upper: Option<f64>,
    /// Unit rate in cents (per kWh or kL)
    #[serde(default)]
    pub rate_cents: Option<f64>,
}

/// Why a pricing structure could not be evaluated against a line item
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingFault {
    #[error("line item has no quantity to price")]
    MissingQuantity,
    #[error("property has no municipal valuation to price rates against")]
    MissingValuation,
    #[error("a pricing band is missing its rate")]
    MissingRate,
    #[error("{0} pricing cannot be evaluated from a single metered quantity")]
    NotEvaluable(&'static str),
}

/// The pricing structure of a tariff rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PricingStructure {
    /// Stepped energy blocks (electricity, kWh)
    EnergyBands { bands: Vec<Band> },
    /// Stepped consumption blocks (water, kL)
    ConsumptionBands { bands: Vec<Band> },
    /// Fixed monthly amount in cents
    FlatRate { amount_cents: i64 },
    /// Demand charge in cents per kVA
    DemandCharge { rate_cents_per_kva: f64 },
    /// Time-of-use energy rates in cents per kWh
    TimeOfUse {
        peak_cents: f64,
        standard_cents: f64,
        off_peak_cents: f64,
    },
    /// Property rates: annual rate-in-the-rand applied to the municipal
    /// valuation, less a rebate portion
    RateInRand {
        annual_rate: f64,
        #[serde(default)]
        rebate_cents: i64,
    },
}

impl PricingStructure {
    /// A structure the engine must skip as a knowledge-store data fault
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::EnergyBands { bands } | Self::ConsumptionBands { bands } => {
                bands.is_empty() || bands.iter().any(|b| b.rate_cents.is_none())
            }
            _ => false,
        }
    }

    /// Expected charge in cents for a line item.
    ///
    /// Banded and flat structures price the metered `quantity`; rate-in-rand
    /// prices the property `valuation_cents` (monthly, i.e. annual / 12).
    /// Time-of-use and demand structures are not evaluable from a single
    /// metered quantity and report that rather than guessing a split.
    pub fn expected_cents(
        &self,
        quantity: Option<f64>,
        valuation_cents: Option<i64>,
    ) -> Result<i64, PricingFault> {
        match self {
            Self::EnergyBands { bands } | Self::ConsumptionBands { bands } => {
                let quantity = quantity.ok_or(PricingFault::MissingQuantity)?;
                banded_total(bands, quantity)
            }
            Self::FlatRate { amount_cents } => Ok(*amount_cents),
            Self::DemandCharge { .. } => Err(PricingFault::NotEvaluable("demand-charge")),
            Self::TimeOfUse { .. } => Err(PricingFault::NotEvaluable("time-of-use")),
            Self::RateInRand {
                annual_rate,
                rebate_cents,
            } => {
                let valuation = valuation_cents.ok_or(PricingFault::MissingValuation)?;
                let taxable = (valuation - rebate_cents).max(0);
                Ok((taxable as f64 * annual_rate / 12.0).round() as i64)
            }
        }
    }
}

/// Sum quantity-in-band x band-rate over ascending bands
fn banded_total(bands: &[Band], quantity: f64) -> Result<i64, PricingFault> {
    let mut ordered: Vec<&Band> = bands.iter().collect();
    ordered.sort_by(|a, b| a.lower.total_cmp(&b.lower));

    let mut total = 0.0;
    for band in ordered {
        let rate = band.rate_cents.ok_or(PricingFault::MissingRate)?;
        let upper = band.upper.unwrap_or(f64::INFINITY);
        let in_band = (quantity.min(upper) - band.lower).max(0.0);
        total += in_band * rate;
    }
    Ok(total.round() as i64)
}

/// An official, dated pricing definition for a provider/service/category
/// combination. Created by ingestion, mutated only by admin verification,
/// soft-deactivated rather than deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRule {
    pub id: String,
    /// Issuing provider (e.g. "City Power", "Johannesburg Water")
    pub provider: String,
    pub service: ServiceType,
    #[serde(default)]
    pub tariff_code: Option<String>,
    pub category: CustomerCategory,
    pub pricing: PricingStructure,
    /// VAT rate the rule's amounts relate to (e.g. 0.15)
    #[serde(default)]
    pub vat_rate: f64,
    /// Whether the rule's amounts include VAT
    #[serde(default)]
    pub vat_inclusive: bool,
    pub effective_date: NaiveDate,
    /// Open-ended when unset
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    /// Municipal financial year, e.g. "2025/26"
    pub financial_year: String,
    pub source_document: String,
    pub source_excerpt: String,
    #[serde(default)]
    pub source_page: Option<u32>,
    /// Extraction confidence from ingestion (0.0-1.0)
    pub extraction_confidence: f64,
    /// Whether an admin has verified the extraction
    #[serde(default)]
    pub verified: bool,
    /// Soft-deactivation flag
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TariffRule {
    /// Whether the rule covers `date` (`effective <= date <= expiry`)
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.effective_date <= date && self.expiry_date.map_or(true, |exp| date <= exp)
    }
}

/// The municipal financial year containing `date`, e.g. "2025/26".
/// Financial years run July to June.
pub fn financial_year(date: NaiveDate) -> String {
    let start_year = if date.month() >= 7 {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{}/{:02}", start_year, (start_year + 1) % 100)
}

/// Read-only query capability over the tariff knowledge base.
///
/// The engine only calls this synchronously; an async-backed store wraps
/// its own runtime behind this trait.
pub trait TariffStore {
    /// Active rules for the provider/service/financial-year whose validity
    /// window contains `on_date`, optionally narrowed to one customer
    /// category.
    fn find_active_rules(
        &self,
        provider: &str,
        service: ServiceType,
        category: Option<CustomerCategory>,
        financial_year: &str,
        on_date: NaiveDate,
    ) -> Vec<TariffRule>;
}

/// Tariff store backed by an in-memory rule list (tests, CLI fixtures)
#[derive(Debug, Clone, Default)]
pub struct InMemoryTariffStore {
    rules: Vec<TariffRule>,
}

impl InMemoryTariffStore {
    pub fn new(rules: Vec<TariffRule>) -> Self {
        Self { rules }
    }

    /// Parse a JSON array of tariff rules
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let rules: Vec<TariffRule> = serde_json::from_str(json)?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[TariffRule] {
        &self.rules
    }
}

impl TariffStore for InMemoryTariffStore {
    fn find_active_rules(
        &self,
        provider: &str,
        service: ServiceType,
        category: Option<CustomerCategory>,
        financial_year: &str,
        on_date: NaiveDate,
    ) -> Vec<TariffRule> {
        self.rules
            .iter()
            .filter(|r| r.active)
            .filter(|r| r.provider.eq_ignore_ascii_case(provider))
            .filter(|r| r.service == service)
            .filter(|r| r.financial_year == financial_year)
            .filter(|r| r.covers(on_date))
            .filter(|r| category.map_or(true, |c| r.category == c))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(lower: f64, upper: Option<f64>, rate: f64) -> Band {
        Band {
            lower,
            upper,
            rate_cents: Some(rate),
        }
    }

    fn coj_energy_bands() -> Vec<Band> {
        vec![
            band(0.0, Some(350.0), 219.45),
            band(350.0, Some(500.0), 251.30),
            band(500.0, None, 274.95),
        ]
    }

    #[test]
    fn test_banded_total_within_first_band() {
        let bands = coj_energy_bands();
        // 100 kWh all in band 1
        assert_eq!(banded_total(&bands, 100.0).unwrap(), 21945);
    }

    #[test]
    fn test_banded_total_spans_bands() {
        let bands = coj_energy_bands();
        // 350 * 219.45 + 100 * 251.30
        assert_eq!(banded_total(&bands, 450.0).unwrap(), 101938);
    }

    #[test]
    fn test_banded_total_last_band_unbounded() {
        let bands = coj_energy_bands();
        // 350 * 219.45 + 150 * 251.30 + 200 * 274.95
        assert_eq!(banded_total(&bands, 700.0).unwrap(), 169493);
    }

    #[test]
    fn test_banded_total_is_idempotent() {
        let bands = coj_energy_bands();
        let first = banded_total(&bands, 437.5).unwrap();
        let second = banded_total(&bands, 437.5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_banded_total_unsorted_input() {
        let mut bands = coj_energy_bands();
        bands.reverse();
        assert_eq!(banded_total(&bands, 450.0).unwrap(), 101938);
    }

    #[test]
    fn test_band_missing_rate_is_malformed() {
        let pricing = PricingStructure::EnergyBands {
            bands: vec![
                band(0.0, Some(350.0), 219.45),
                Band {
                    lower: 350.0,
                    upper: None,
                    rate_cents: None,
                },
            ],
        };
        assert!(pricing.is_malformed());
        assert_eq!(
            pricing.expected_cents(Some(400.0), None),
            Err(PricingFault::MissingRate)
        );
    }

    #[test]
    fn test_rate_in_rand_monthly_with_rebate() {
        let pricing = PricingStructure::RateInRand {
            annual_rate: 0.0095447,
            rebate_cents: 30_000_000,
        };
        // R500 000 valuation: (50 000 000 - 30 000 000) * 0.0095447 / 12
        assert_eq!(
            pricing.expected_cents(None, Some(50_000_000)).unwrap(),
            15908
        );
        // Valuation below the rebate floors at zero
        assert_eq!(
            pricing.expected_cents(None, Some(20_000_000)).unwrap(),
            0
        );
    }

    #[test]
    fn test_time_of_use_not_evaluable() {
        let pricing = PricingStructure::TimeOfUse {
            peak_cents: 401.1,
            standard_cents: 265.3,
            off_peak_cents: 180.2,
        };
        assert!(matches!(
            pricing.expected_cents(Some(450.0), None),
            Err(PricingFault::NotEvaluable(_))
        ));
    }

    #[test]
    fn test_financial_year_july_to_june() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(financial_year(d(2025, 7, 1)), "2025/26");
        assert_eq!(financial_year(d(2026, 6, 30)), "2025/26");
        assert_eq!(financial_year(d(2026, 7, 1)), "2026/27");
        assert_eq!(financial_year(d(2025, 3, 15)), "2024/25");
    }

    #[test]
    fn test_store_filters_inactive_and_expired() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let rule = TariffRule {
            id: "cp-res-2025".into(),
            provider: "City Power".into(),
            service: ServiceType::Electricity,
            tariff_code: None,
            category: CustomerCategory::Residential,
            pricing: PricingStructure::EnergyBands {
                bands: coj_energy_bands(),
            },
            vat_rate: 0.15,
            vat_inclusive: false,
            effective_date: d(2025, 7, 1),
            expiry_date: Some(d(2026, 6, 30)),
            financial_year: "2025/26".into(),
            source_document: "CoJ Electricity Tariff Schedule 2025/26".into(),
            source_excerpt: "Block 1 (0-350 kWh): 219.45c/kWh".into(),
            source_page: Some(4),
            extraction_confidence: 0.93,
            verified: true,
            active: true,
        };

        let mut inactive = rule.clone();
        inactive.id = "cp-res-2025-old".into();
        inactive.active = false;

        let store = InMemoryTariffStore::new(vec![rule, inactive]);

        let hits = store.find_active_rules(
            "city power",
            ServiceType::Electricity,
            None,
            "2025/26",
            d(2025, 8, 1),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "cp-res-2025");

        // Outside the validity window
        assert!(store
            .find_active_rules(
                "City Power",
                ServiceType::Electricity,
                None,
                "2025/26",
                d(2026, 8, 1),
            )
            .is_empty());

        // Category narrowing
        assert!(store
            .find_active_rules(
                "City Power",
                ServiceType::Electricity,
                Some(CustomerCategory::Business),
                "2025/26",
                d(2025, 8, 1),
            )
            .is_empty());
    }

    #[test]
    fn test_rule_json_round_trip() {
        let json = r#"{
            "id": "jw-res-2025",
            "provider": "Johannesburg Water",
            "service": "water",
            "category": "residential",
            "pricing": {
                "type": "consumption_bands",
                "bands": [
                    {"lower": 0.0, "upper": 6.0, "rate_cents": 0.0},
                    {"lower": 6.0, "rate_cents": 3156.0}
                ]
            },
            "effective_date": "2025-07-01",
            "financial_year": "2025/26",
            "source_document": "CoJ Water Tariff Schedule 2025/26",
            "source_excerpt": "0-6 kL free basic water",
            "extraction_confidence": 0.9
        }"#;
        let rule: TariffRule = serde_json::from_str(json).unwrap();
        assert!(rule.active, "active defaults to true");
        assert!(!rule.verified);
        assert_eq!(rule.pricing.expected_cents(Some(10.0), None).unwrap(), 12624);
    }
}
