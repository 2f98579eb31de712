//! Analysis engine - orchestrates classification, analyzers and verification

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::classify::classify;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::markers::{Marker, MarkerSet};
use crate::models::{LineItem, ParsedBill, PropertyClass, ServiceType};
use crate::report::Summary;
use crate::verify::{ChargeVerification, VerificationEngine};

use super::types::{AnalyzerKind, Insight};
use super::{
    ElectricityAnalyzer, RatesAnalyzer, RefuseAnalyzer, SewerageAnalyzer, WaterAnalyzer,
    WholeBillAnalyzer,
};

/// Context provided to bill analyzers
pub struct AnalysisContext<'a> {
    pub bill: &'a ParsedBill,
    /// Classification result; computed before any analyzer runs
    pub classification: PropertyClass,
    pub config: &'a AnalysisConfig,
    pub markers: &'a MarkerSet,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        bill: &'a ParsedBill,
        classification: PropertyClass,
        config: &'a AnalysisConfig,
        markers: &'a MarkerSet,
    ) -> Self {
        Self {
            bill,
            classification,
            config,
            markers,
        }
    }

    /// First line item for a service
    pub fn line(&self, service: ServiceType) -> Option<&'a LineItem> {
        self.bill.line_item(service)
    }

    /// Whether a marker is present in the statement text
    pub fn has(&self, marker: Marker) -> bool {
        self.markers.has(&self.bill.raw_text, marker)
    }

    /// Captured number for a numeric marker, if present
    pub fn number(&self, marker: Marker) -> Option<f64> {
        self.markers.extract_number(&self.bill.raw_text, marker)
    }

    /// Billing days for the statement: the stated reading period, or the
    /// configured default when the statement does not state one.
    pub fn billing_days(&self) -> f64 {
        self.number(Marker::ReadingPeriodDays)
            .filter(|d| *d > 0.0)
            .unwrap_or(self.config.default_billing_days as f64)
    }
}

/// Trait for per-service bill analyzers.
///
/// Analyzers are pure functions of the context: no I/O, no shared state,
/// and never an error - missing data is a valid "no insight" outcome.
pub trait BillAnalyzer: Send + Sync {
    /// Unique identifier for this analyzer
    fn id(&self) -> AnalyzerKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Inspect the bill and produce insights
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight>;
}

/// The complete result of analyzing one bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillAnalysis {
    pub account_number: Option<String>,
    pub bill_date: Option<NaiveDate>,
    pub classification: PropertyClass,
    pub current_charges_cents: Option<i64>,
    /// Insights sorted by severity (highest first), stable within a severity
    pub insights: Vec<Insight>,
    /// Per-charge verification outcomes, in statement order (empty when the
    /// analysis ran without a tariff store)
    pub verifications: Vec<ChargeVerification>,
    pub summary: Summary,
}

/// The main engine that runs classification and all analyzers over a bill
pub struct AnalysisEngine {
    config: AnalysisConfig,
    markers: MarkerSet,
    analyzers: Vec<Box<dyn BillAnalyzer>>,
}

impl AnalysisEngine {
    /// Create an engine with the default configuration and built-in analyzers
    pub fn new() -> Result<Self> {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        let mut engine = Self {
            config,
            markers: MarkerSet::new()?,
            analyzers: vec![],
        };

        // Register built-in analyzers
        engine.register(Box::new(ElectricityAnalyzer::new()));
        engine.register(Box::new(WaterAnalyzer::new()));
        engine.register(Box::new(SewerageAnalyzer::new()));
        engine.register(Box::new(RatesAnalyzer::new()));
        engine.register(Box::new(RefuseAnalyzer::new()));
        engine.register(Box::new(WholeBillAnalyzer::new()));

        Ok(engine)
    }

    /// Register an analyzer
    pub fn register(&mut self, analyzer: Box<dyn BillAnalyzer>) {
        self.analyzers.push(analyzer);
    }

    /// Get list of registered analyzer kinds
    pub fn analyzer_kinds(&self) -> Vec<AnalyzerKind> {
        self.analyzers.iter().map(|a| a.id()).collect()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Classify the property on a bill
    pub fn classify(&self, bill: &ParsedBill) -> PropertyClass {
        classify(bill, &self.markers, &self.config)
    }

    /// Run classification and all analyzers. Always returns an analysis:
    /// a bill with no line items yields an empty-but-valid result.
    pub fn analyze(&self, bill: &ParsedBill) -> BillAnalysis {
        self.run(bill, None)
    }

    /// Run the full pipeline including per-charge tariff verification
    pub fn analyze_with_verification(
        &self,
        bill: &ParsedBill,
        verifier: &VerificationEngine<'_>,
    ) -> BillAnalysis {
        self.run(bill, Some(verifier))
    }

    fn run(&self, bill: &ParsedBill, verifier: Option<&VerificationEngine<'_>>) -> BillAnalysis {
        let classification = self.classify(bill);
        let ctx = AnalysisContext::new(bill, classification, &self.config, &self.markers);

        let mut insights = vec![];
        for analyzer in &self.analyzers {
            let found = analyzer.analyze(&ctx);
            tracing::debug!(
                analyzer = analyzer.id().as_str(),
                count = found.len(),
                "Bill analysis complete"
            );
            insights.extend(found);
        }

        // Sort by severity (highest first); stable, so statement order is
        // preserved within a severity
        insights.sort_by(|a, b| b.severity.priority().cmp(&a.severity.priority()));

        let verifications = verifier
            .map(|v| v.verify_bill(bill, classification))
            .unwrap_or_default();

        let summary = Summary::compute(&insights, &verifications);

        BillAnalysis {
            account_number: bill.account_number.clone(),
            bill_date: bill.bill_date,
            classification,
            current_charges_cents: bill.current_charges_cents,
            insights,
            verifications,
            summary,
        }
    }
}
