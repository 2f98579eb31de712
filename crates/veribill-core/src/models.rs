//! Domain models for Veribill
//!
//! The bill model is the normalized representation of a municipal statement
//! as produced by the external PDF parser. All monetary values are integer
//! cents to avoid floating-point drift; only estimate factors and unit rates
//! are floating point.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Utility services that can appear as charge rows on a municipal statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Electricity,
    Water,
    Sewerage,
    Refuse,
    Rates,
    Sundry,
    Other,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Water => "water",
            Self::Sewerage => "sewerage",
            Self::Refuse => "refuse",
            Self::Rates => "rates",
            Self::Sundry => "sundry",
            Self::Other => "other",
        }
    }

    /// Services the verification engine can match against tariff rules.
    /// Sundry charges carry no tariff identity and are never verified.
    pub fn is_verifiable(&self) -> bool {
        !matches!(self, Self::Sundry | Self::Other)
    }
}

impl std::str::FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "electricity" => Ok(Self::Electricity),
            "water" => Ok(Self::Water),
            "sewerage" | "sanitation" => Ok(Self::Sewerage),
            "refuse" | "waste" => Ok(Self::Refuse),
            "rates" => Ok(Self::Rates),
            "sundry" => Ok(Self::Sundry),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown service type: {}", s)),
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inferred property classification, derived from statement text and rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyClass {
    Residential,
    Business,
    /// Both business and residential rates appear on the statement
    Mixed,
    #[default]
    Unknown,
}

impl PropertyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Business => "business",
            Self::Mixed => "mixed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for PropertyClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "residential" => Ok(Self::Residential),
            "business" => Ok(Self::Business),
            "mixed" => Ok(Self::Mixed),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown property class: {}", s)),
        }
    }
}

impl std::fmt::Display for PropertyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a meter reading was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingKind {
    /// Read from the physical meter
    Actual,
    /// Estimated by the municipality (no physical reading taken)
    Estimated,
    /// Self-reading submitted by the customer
    Customer,
}

impl ReadingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actual => "actual",
            Self::Estimated => "estimated",
            Self::Customer => "customer",
        }
    }
}

impl std::str::FromStr for ReadingKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "actual" => Ok(Self::Actual),
            "estimated" | "estimate" => Ok(Self::Estimated),
            "customer" | "own reading" => Ok(Self::Customer),
            _ => Err(format!("Unknown reading kind: {}", s)),
        }
    }
}

impl std::fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One meter's contribution to an electricity or water charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    #[serde(default)]
    pub meter_number: Option<String>,
    /// Consumption for the billing period (kWh or kL)
    #[serde(default)]
    pub consumption: Option<f64>,
    #[serde(default)]
    pub reading_kind: Option<ReadingKind>,
}

/// Service-specific line item detail, one tagged variant per service.
///
/// The upstream parser emits these as a typed shape rather than a free-form
/// map so analyzers never probe for absent or mistyped fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LineItemMetadata {
    Electricity {
        #[serde(default)]
        meters: Vec<MeterReading>,
    },
    Water {
        /// Metered consumption in kilolitres
        #[serde(default)]
        consumption_kl: Option<f64>,
    },
    Sewerage {
        #[serde(default)]
        living_units: Option<u32>,
    },
    Rates {
        /// Rate-in-the-rand actually applied on the statement
        #[serde(default)]
        rate_used: Option<f64>,
    },
    Refuse {
        #[serde(default)]
        bin_count: Option<u32>,
    },
    #[default]
    None,
}

/// One charge row on a municipal statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub service: ServiceType,
    pub description: String,
    /// Billed units (kWh, kL, bins, ...) when derivable from the statement
    #[serde(default)]
    pub quantity: Option<f64>,
    /// Unit price in cents when derivable from the statement
    #[serde(default)]
    pub unit_price_cents: Option<f64>,
    /// Charge amount in cents. Always present.
    pub amount_cents: i64,
    #[serde(default)]
    pub tariff_code: Option<String>,
    /// The charge was billed from an estimated reading
    #[serde(default)]
    pub is_estimated: bool,
    #[serde(default)]
    pub metadata: LineItemMetadata,
}

impl LineItem {
    pub fn new(service: ServiceType, description: impl Into<String>, amount_cents: i64) -> Self {
        Self {
            service,
            description: description.into(),
            quantity: None,
            unit_price_cents: None,
            amount_cents,
            tariff_code: None,
            is_estimated: false,
            metadata: LineItemMetadata::None,
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_tariff_code(mut self, code: impl Into<String>) -> Self {
        self.tariff_code = Some(code.into());
        self
    }

    pub fn with_metadata(mut self, metadata: LineItemMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Property details parsed from the statement header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PropertyInfo {
    #[serde(default)]
    pub address: Option<String>,
    /// Stand (erf) size in square metres
    #[serde(default)]
    pub stand_size_sqm: Option<f64>,
    /// Number of living units on the property
    #[serde(default)]
    pub unit_count: Option<u32>,
    /// Property type text as printed on the statement
    #[serde(default)]
    pub property_type: Option<String>,
    /// Municipal valuation in cents
    #[serde(default)]
    pub municipal_valuation_cents: Option<i64>,
}

/// A normalized municipal statement, as produced by the external PDF parser.
///
/// Every field except `line_items` and `raw_text` may be absent; the
/// analysis pipeline degrades to "no insight" rather than erroring on
/// partial data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParsedBill {
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub bill_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub total_due_cents: Option<i64>,
    #[serde(default)]
    pub previous_balance_cents: Option<i64>,
    #[serde(default)]
    pub current_charges_cents: Option<i64>,
    #[serde(default)]
    pub vat_cents: Option<i64>,
    #[serde(default)]
    pub property: Option<PropertyInfo>,
    /// Charge rows in source-document order. Analyzers look up by service
    /// type, not position.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Raw statement text, used only through the marker predicates
    #[serde(default)]
    pub raw_text: String,
}

impl ParsedBill {
    /// First line item for a service, if any
    pub fn line_item(&self, service: ServiceType) -> Option<&LineItem> {
        self.line_items.iter().find(|li| li.service == service)
    }

    /// All line items for a service
    pub fn line_items_for(&self, service: ServiceType) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(move |li| li.service == service)
    }
}

/// Format a cents amount as rand for display (e.g. `R1234.56`)
pub fn format_rand(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}R{}.{:02}", sign, abs / 100, abs % 100)
}
