//! Statement-text markers
//!
//! City of Johannesburg statements carry information that the structured
//! parse does not capture: rebate clauses, reading-period lengths, bin
//! counts. Those are detected here through a closed, enumerable set of
//! named markers rather than ad-hoc regular expressions inline in analyzer
//! logic, so the set is testable in isolation and replaceable if the
//! upstream document layout changes.

use std::collections::HashMap;

use regex::Regex;

use crate::error::Result;

/// A named text heuristic over the raw statement text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Business property-rates charge appears on the statement
    BusinessRates,
    /// Residential property-rates charge appears on the statement
    ResidentialRates,
    /// A meter reading was estimated ("Type: Estimated")
    EstimatedReading,
    /// Interest is being charged on the arrears balance
    InterestOnArrears,
    /// The first-R300 000 residential rates rebate was applied
    RatesRebate,
    /// Sewerage billed on stand size
    SewerageStandSize,
    /// Sewerage billed per living unit
    SeweragePerUnit,
    /// Numeric: billing days ("Reading period ... = N days")
    ReadingPeriodDays,
    /// Numeric: refuse bin count ("<N>-bin")
    BinCount,
}

impl Marker {
    pub fn all() -> &'static [Marker] {
        &[
            Self::BusinessRates,
            Self::ResidentialRates,
            Self::EstimatedReading,
            Self::InterestOnArrears,
            Self::RatesRebate,
            Self::SewerageStandSize,
            Self::SeweragePerUnit,
            Self::ReadingPeriodDays,
            Self::BinCount,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessRates => "business_rates",
            Self::ResidentialRates => "residential_rates",
            Self::EstimatedReading => "estimated_reading",
            Self::InterestOnArrears => "interest_on_arrears",
            Self::RatesRebate => "rates_rebate",
            Self::SewerageStandSize => "sewerage_stand_size",
            Self::SeweragePerUnit => "sewerage_per_unit",
            Self::ReadingPeriodDays => "reading_period_days",
            Self::BinCount => "bin_count",
        }
    }

    /// Whether this marker captures a number (vs a plain presence check)
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::ReadingPeriodDays | Self::BinCount)
    }

    fn pattern(&self) -> &'static str {
        match self {
            Self::BusinessRates => r"(?i)business\s+rates?|rates?\s*[-:]\s*business",
            Self::ResidentialRates => r"(?i)residential\s+rates?|rates?\s*[-:]\s*residential",
            Self::EstimatedReading => r"(?i)type:\s*estimated",
            Self::InterestOnArrears => r"(?i)interest\s+on\s+arrears",
            Self::RatesRebate => r"(?i)less\s+rates\s+on\s+first\s+r300",
            Self::SewerageStandSize => r"(?i)based\s+on\s+stand\s+size",
            Self::SeweragePerUnit => r"(?i)per\s+living\s+unit",
            Self::ReadingPeriodDays => r"(?i)reading\s+period[^=\r\n]*=\s*(\d+)\s*days?",
            Self::BinCount => r"(?i)(\d+)\s*-\s*bin",
        }
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The compiled marker set. Built once and shared by the whole pipeline.
#[derive(Debug)]
pub struct MarkerSet {
    patterns: HashMap<Marker, Regex>,
}

impl MarkerSet {
    pub fn new() -> Result<Self> {
        let mut patterns = HashMap::new();
        for marker in Marker::all() {
            patterns.insert(*marker, Regex::new(marker.pattern())?);
        }
        Ok(Self { patterns })
    }

    /// Whether the marker is present in the statement text
    pub fn has(&self, text: &str, marker: Marker) -> bool {
        self.patterns[&marker].is_match(text)
    }

    /// First captured number for a numeric marker, if present
    pub fn extract_number(&self, text: &str, marker: Marker) -> Option<f64> {
        self.patterns[&marker]
            .captures(text)?
            .get(1)?
            .as_str()
            .parse()
            .ok()
    }

    /// Markers present in the statement text, in declaration order
    pub fn matched(&self, text: &str) -> Vec<Marker> {
        Marker::all()
            .iter()
            .copied()
            .filter(|m| self.has(text, *m))
            .collect()
    }
}
