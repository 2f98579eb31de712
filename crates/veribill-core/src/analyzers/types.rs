//! Core types for bill insights

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::ServiceType;

/// The analyzer that produced an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    Electricity,
    Water,
    Sewerage,
    Rates,
    Refuse,
    /// Checks that look at the statement as a whole rather than one service
    WholeBill,
}

impl AnalyzerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Electricity => "electricity",
            AnalyzerKind::Water => "water",
            AnalyzerKind::Sewerage => "sewerage",
            AnalyzerKind::Rates => "rates",
            AnalyzerKind::Refuse => "refuse",
            AnalyzerKind::WholeBill => "whole_bill",
        }
    }

    /// The service this analyzer inspects, if it is service-specific
    pub fn service(&self) -> Option<ServiceType> {
        match self {
            AnalyzerKind::Electricity => Some(ServiceType::Electricity),
            AnalyzerKind::Water => Some(ServiceType::Water),
            AnalyzerKind::Sewerage => Some(ServiceType::Sewerage),
            AnalyzerKind::Rates => Some(ServiceType::Rates),
            AnalyzerKind::Refuse => Some(ServiceType::Refuse),
            AnalyzerKind::WholeBill => None,
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalyzerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electricity" => Ok(AnalyzerKind::Electricity),
            "water" => Ok(AnalyzerKind::Water),
            "sewerage" => Ok(AnalyzerKind::Sewerage),
            "rates" => Ok(AnalyzerKind::Rates),
            "refuse" => Ok(AnalyzerKind::Refuse),
            "whole_bill" => Ok(AnalyzerKind::WholeBill),
            _ => Err(format!("Unknown analyzer kind: {}", s)),
        }
    }
}

/// How urgent an insight is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational - no action needed
    Info,
    /// Worth attention but not urgent
    Attention,
    /// The account holder should act on this
    ActionRequired,
    /// Requires immediate attention
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Attention => "attention",
            Severity::ActionRequired => "action_required",
            Severity::Critical => "critical",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Info => 1,
            Severity::Attention => 2,
            Severity::ActionRequired => 3,
            Severity::Critical => 4,
        }
    }

    /// Whether savings attached at this severity count as recoverable.
    /// Informational and attention-level estimates are indicative only.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Severity::ActionRequired | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "attention" => Ok(Severity::Attention),
            "action_required" => Ok(Severity::ActionRequired),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// A savings or impact estimate in cents, as a min/max range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactRange {
    pub min_cents: i64,
    pub max_cents: i64,
}

impl ImpactRange {
    pub fn new(min_cents: i64, max_cents: i64) -> Self {
        Self {
            min_cents,
            max_cents,
        }
    }

    /// A point estimate (min == max)
    pub fn exact(cents: i64) -> Self {
        Self::new(cents, cents)
    }
}

/// Where a finding comes from.
///
/// A sourced citation always carries a resolvable document reference and
/// excerpt; an unsourced one always carries a non-empty reason. The tagged
/// representation makes that invariant structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Citation {
    Sourced {
        /// Knowledge-document reference (e.g. the tariff schedule name)
        document: String,
        /// The minimal excerpt supporting the finding
        excerpt: String,
        #[serde(default)]
        page: Option<u32>,
    },
    Unsourced {
        reason: String,
    },
}

impl Citation {
    pub fn has_source(&self) -> bool {
        matches!(self, Citation::Sourced { .. })
    }
}

/// An actionable observation about a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// The analyzer that produced this insight
    pub analyzer: AnalyzerKind,
    /// The service the insight concerns (None for whole-bill observations)
    pub service: Option<ServiceType>,
    pub severity: Severity,
    /// Short title (e.g. "Estimated electricity reading")
    pub title: String,
    /// What was found
    pub finding: String,
    /// What it means for the account holder
    #[serde(default)]
    pub implication: Option<String>,
    /// What the account holder should do about it
    #[serde(default)]
    pub action: Option<String>,
    /// Estimated monthly savings or impact, when quantifiable
    #[serde(default)]
    pub savings: Option<ImpactRange>,
    #[serde(default)]
    pub citation: Option<Citation>,
}

impl Insight {
    pub fn new(
        analyzer: AnalyzerKind,
        severity: Severity,
        title: impl Into<String>,
        finding: impl Into<String>,
    ) -> Self {
        Self {
            analyzer,
            service: analyzer.service(),
            severity,
            title: title.into(),
            finding: finding.into(),
            implication: None,
            action: None,
            savings: None,
            citation: None,
        }
    }

    pub fn with_implication(mut self, implication: impl Into<String>) -> Self {
        self.implication = Some(implication.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_savings(mut self, savings: ImpactRange) -> Self {
        self.savings = Some(savings);
        self
    }

    pub fn with_citation(mut self, citation: Citation) -> Self {
        self.citation = Some(citation);
        self
    }
}
