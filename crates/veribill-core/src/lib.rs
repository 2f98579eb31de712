//! Veribill Core Library
//!
//! Shared functionality for the Veribill municipal bill verification tool:
//! - Normalized bill model (as produced by the external statement parser)
//! - Statement-text marker predicates
//! - Property classification heuristics
//! - Per-service bill analyzers and the analysis engine
//! - Tariff knowledge-store abstraction and charge verification
//! - Summary aggregation and plain-text report rendering
//!
//! The core is synchronous and side-effect free: one analysis run is a pure
//! transformation of a [`models::ParsedBill`] plus read-only queries against
//! a [`tariff::TariffStore`]. Persistence of the resulting findings belongs
//! to the caller.

pub mod analyzers;
pub mod classify;
pub mod config;
pub mod error;
pub mod markers;
pub mod models;
pub mod report;
pub mod tariff;
pub mod verify;

/// Test utilities: bill and tariff fixture builders
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analyzers::{
    AnalysisContext, AnalysisEngine, AnalyzerKind, BillAnalysis, BillAnalyzer, Citation,
    ImpactRange, Insight, Severity,
};
pub use classify::classify;
pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use markers::{Marker, MarkerSet};
pub use models::{
    format_rand, LineItem, LineItemMetadata, MeterReading, ParsedBill, PropertyClass,
    PropertyInfo, ReadingKind, ServiceType,
};
pub use report::Summary;
pub use tariff::{
    financial_year, Band, CustomerCategory, InMemoryTariffStore, PricingStructure, TariffRule,
    TariffStore,
};
pub use verify::{
    ChargeVerification, MissingRuleIdentity, VerificationEngine, VerificationResult,
    VerificationStatus,
};
