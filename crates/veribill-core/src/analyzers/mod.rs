//! Bill analyzers - per-service insight generation
//!
//! Each analyzer inspects one aspect of a parsed statement and emits zero
//! or more insights. Analyzers are independent of each other: none reads
//! another's output, so they may run in any order. The only sequencing
//! constraint in the pipeline is that property classification completes
//! first, since several analyzers consult it.
//!
//! ## Built-in analyzers
//!
//! - **Electricity** - estimated readings, high daily consumption, multi-meter setups
//! - **Water** - demand-levy-only charges, leak-level consumption
//! - **Sewerage** - billing-method information
//! - **Rates** - business-vs-residential estimates, missing rebate
//! - **Refuse** - business waste-arrangement checks
//! - **Whole bill** - arrears balance and interest accrual
//!
//! ## Usage
//!
//! ```rust,ignore
//! use veribill_core::analyzers::AnalysisEngine;
//!
//! let engine = AnalysisEngine::new()?;
//! let analysis = engine.analyze(&bill);
//! ```

pub mod electricity;
pub mod engine;
pub mod rates;
pub mod refuse;
pub mod sewerage;
pub mod types;
pub mod water;
pub mod whole_bill;

pub use electricity::ElectricityAnalyzer;
pub use engine::{AnalysisContext, AnalysisEngine, BillAnalysis, BillAnalyzer};
pub use rates::RatesAnalyzer;
pub use refuse::RefuseAnalyzer;
pub use sewerage::SewerageAnalyzer;
pub use types::{AnalyzerKind, Citation, ImpactRange, Insight, Severity};
pub use water::WaterAnalyzer;
pub use whole_bill::WholeBillAnalyzer;
