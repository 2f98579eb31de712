//! Summary aggregation and plain-text report rendering
//!
//! Pure functions of the analysis result: no I/O, fully unit-testable by
//! string comparison. The report is for operator/debug consumption;
//! user-facing rendering happens elsewhere.

use serde::{Deserialize, Serialize};

use crate::analyzers::engine::BillAnalysis;
use crate::analyzers::types::{Citation, Insight, Severity};
use crate::models::format_rand;
use crate::verify::{ChargeVerification, VerificationStatus};

/// Aggregated counts and totals for one analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Summary {
    pub info_count: usize,
    pub attention_count: usize,
    pub action_required_count: usize,
    pub critical_count: usize,

    pub verified_count: usize,
    pub likely_wrong_count: usize,
    pub cannot_verify_count: usize,

    /// Total estimated recoverable amount (cents). Only likely-wrong
    /// charges and action-required/critical insights contribute;
    /// informational and attention-level estimates are indicative only.
    pub recoverable_min_cents: i64,
    pub recoverable_max_cents: i64,
}

impl Summary {
    pub fn compute(insights: &[Insight], verifications: &[ChargeVerification]) -> Self {
        let mut summary = Self::default();

        for insight in insights {
            match insight.severity {
                Severity::Info => summary.info_count += 1,
                Severity::Attention => summary.attention_count += 1,
                Severity::ActionRequired => summary.action_required_count += 1,
                Severity::Critical => summary.critical_count += 1,
            }
            if insight.severity.is_recoverable() {
                if let Some(savings) = insight.savings {
                    summary.recoverable_min_cents += savings.min_cents;
                    summary.recoverable_max_cents += savings.max_cents;
                }
            }
        }

        for verification in verifications {
            match verification.result.status {
                VerificationStatus::Verified => summary.verified_count += 1,
                VerificationStatus::LikelyWrong => {
                    summary.likely_wrong_count += 1;
                    if let Some(impact) = verification.result.impact {
                        summary.recoverable_min_cents += impact.min_cents;
                        summary.recoverable_max_cents += impact.max_cents;
                    }
                }
                VerificationStatus::CannotVerify => summary.cannot_verify_count += 1,
            }
        }

        summary
    }

    pub fn insight_count(&self) -> usize {
        self.info_count + self.attention_count + self.action_required_count + self.critical_count
    }

    pub fn charge_count(&self) -> usize {
        self.verified_count + self.likely_wrong_count + self.cannot_verify_count
    }
}

/// Render an analysis as a deterministic plain-text report.
///
/// Section order is fixed: critical, action required, attention, then info
/// notes, then charge verification, then the summary block.
pub fn render(analysis: &BillAnalysis) -> String {
    let mut out = String::new();

    out.push_str("Bill analysis\n");
    out.push_str("=============\n");
    push_field(&mut out, "Account", analysis.account_number.as_deref());
    push_field(
        &mut out,
        "Bill date",
        analysis.bill_date.map(|d| d.to_string()).as_deref(),
    );
    push_field(
        &mut out,
        "Classification",
        Some(analysis.classification.as_str()),
    );
    push_field(
        &mut out,
        "Current charges",
        analysis
            .current_charges_cents
            .map(format_rand)
            .as_deref(),
    );

    for (heading, severity) in [
        ("CRITICAL", Severity::Critical),
        ("ACTION REQUIRED", Severity::ActionRequired),
        ("ATTENTION", Severity::Attention),
        ("NOTES", Severity::Info),
    ] {
        let matching: Vec<&Insight> = analysis
            .insights
            .iter()
            .filter(|i| i.severity == severity)
            .collect();
        if matching.is_empty() {
            continue;
        }
        push_heading(&mut out, heading);
        for insight in matching {
            push_insight(&mut out, insight);
        }
    }

    if !analysis.verifications.is_empty() {
        push_heading(&mut out, "CHARGE VERIFICATION");
        for verification in &analysis.verifications {
            push_verification(&mut out, verification);
        }
    }

    let summary = &analysis.summary;
    push_heading(&mut out, "SUMMARY");
    out.push_str(&format!(
        "Insights: {} ({} critical, {} action required, {} attention, {} info)\n",
        summary.insight_count(),
        summary.critical_count,
        summary.action_required_count,
        summary.attention_count,
        summary.info_count
    ));
    if summary.charge_count() > 0 {
        out.push_str(&format!(
            "Charges: {} verified, {} likely wrong, {} cannot verify\n",
            summary.verified_count, summary.likely_wrong_count, summary.cannot_verify_count
        ));
    }
    out.push_str(&format!(
        "Estimated recoverable: {}\n",
        render_range(summary.recoverable_min_cents, summary.recoverable_max_cents)
    ));

    out
}

fn push_field(out: &mut String, label: &str, value: Option<&str>) {
    out.push_str(&format!("{}: {}\n", label, value.unwrap_or("-")));
}

fn push_heading(out: &mut String, heading: &str) {
    out.push('\n');
    out.push_str(heading);
    out.push('\n');
    out.push_str(&"-".repeat(heading.len()));
    out.push('\n');
}

fn push_insight(out: &mut String, insight: &Insight) {
    out.push_str(&format!("* {}\n", insight.title));
    out.push_str(&format!("  {}\n", insight.finding));
    if let Some(implication) = &insight.implication {
        out.push_str(&format!("  Why it matters: {}\n", implication));
    }
    if let Some(action) = &insight.action {
        out.push_str(&format!("  Do this: {}\n", action));
    }
    if let Some(savings) = insight.savings {
        out.push_str(&format!(
            "  Estimated saving: {}/month\n",
            render_range(savings.min_cents, savings.max_cents)
        ));
    }
    if let Some(Citation::Sourced { document, page, .. }) = &insight.citation {
        match page {
            Some(page) => out.push_str(&format!("  Source: {} (p{})\n", document, page)),
            None => out.push_str(&format!("  Source: {}\n", document)),
        }
    }
}

fn push_verification(out: &mut String, verification: &ChargeVerification) {
    out.push_str(&format!(
        "* [{}] {} ({}, billed {})\n",
        verification.result.status,
        verification.description,
        verification.service,
        format_rand(verification.billed_cents)
    ));
    match &verification.result.citation {
        Citation::Sourced { document, page, .. } => {
            if let Some(computed) = verification.result.computed_cents {
                out.push_str(&format!("  Tariff amount: {}\n", format_rand(computed)));
            }
            if let Some(impact) = verification.result.impact {
                out.push_str(&format!(
                    "  Estimated impact: {}\n",
                    render_range(impact.min_cents, impact.max_cents)
                ));
            }
            match page {
                Some(page) => out.push_str(&format!("  Source: {} (p{})\n", document, page)),
                None => out.push_str(&format!("  Source: {}\n", document)),
            }
        }
        Citation::Unsourced { reason } => {
            out.push_str(&format!("  Reason: {}\n", reason));
        }
    }
}

fn render_range(min_cents: i64, max_cents: i64) -> String {
    if min_cents == max_cents {
        format_rand(max_cents)
    } else {
        format!("{} to {}", format_rand(min_cents), format_rand(max_cents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{AnalyzerKind, ImpactRange};
    use crate::models::PropertyClass;
    use crate::verify::VerificationResult;

    fn insight(severity: Severity, title: &str) -> Insight {
        Insight::new(AnalyzerKind::WholeBill, severity, title, "finding text")
    }

    #[test]
    fn test_summary_counts_by_severity() {
        let insights = vec![
            insight(Severity::Critical, "a"),
            insight(Severity::Info, "b"),
            insight(Severity::Info, "c"),
            insight(Severity::ActionRequired, "d"),
        ];
        let summary = Summary::compute(&insights, &[]);
        assert_eq!(summary.critical_count, 1);
        assert_eq!(summary.action_required_count, 1);
        assert_eq!(summary.attention_count, 0);
        assert_eq!(summary.info_count, 2);
        assert_eq!(summary.insight_count(), 4);
    }

    #[test]
    fn test_only_recoverable_entries_contribute_to_totals() {
        let insights = vec![
            // Attention savings are indicative, not recoverable
            insight(Severity::Attention, "a").with_savings(ImpactRange::exact(100_000)),
            insight(Severity::ActionRequired, "b").with_savings(ImpactRange::exact(23_862)),
        ];
        let verifications = vec![
            ChargeVerification {
                service: crate::models::ServiceType::Electricity,
                description: "Energy charge".into(),
                billed_cents: 92_500,
                result: VerificationResult {
                    status: VerificationStatus::LikelyWrong,
                    confidence: 0.9,
                    citation: Citation::Sourced {
                        document: "doc".into(),
                        excerpt: "x".into(),
                        page: None,
                    },
                    impact: Some(ImpactRange::new(9_075, 10_000)),
                    computed_cents: Some(82_500),
                    missing_rule: None,
                },
            },
            ChargeVerification {
                service: crate::models::ServiceType::Water,
                description: "Water".into(),
                billed_cents: 45_000,
                result: VerificationResult {
                    status: VerificationStatus::Verified,
                    confidence: 0.9,
                    citation: Citation::Sourced {
                        document: "doc".into(),
                        excerpt: "x".into(),
                        page: None,
                    },
                    impact: None,
                    computed_cents: Some(45_000),
                    missing_rule: None,
                },
            },
        ];

        let summary = Summary::compute(&insights, &verifications);
        assert_eq!(summary.likely_wrong_count, 1);
        assert_eq!(summary.verified_count, 1);
        assert_eq!(summary.recoverable_min_cents, 23_862 + 9_075);
        assert_eq!(summary.recoverable_max_cents, 23_862 + 10_000);
    }

    #[test]
    fn test_render_is_deterministic_and_ordered() {
        let insights = vec![
            insight(Severity::Critical, "Large arrears balance"),
            insight(Severity::Info, "Sewerage billing method"),
            insight(Severity::ActionRequired, "Missing residential rates rebate")
                .with_savings(ImpactRange::exact(23_862)),
        ];
        let summary = Summary::compute(&insights, &[]);
        let analysis = BillAnalysis {
            account_number: Some("550012345".into()),
            bill_date: chrono::NaiveDate::from_ymd_opt(2025, 8, 1),
            classification: PropertyClass::Residential,
            current_charges_cents: Some(425_000),
            insights,
            verifications: vec![],
            summary,
        };

        let report = render(&analysis);
        assert_eq!(report, render(&analysis), "render must be deterministic");

        let expected = "\
Bill analysis
=============
Account: 550012345
Bill date: 2025-08-01
Classification: residential
Current charges: R4250.00

CRITICAL
--------
* Large arrears balance
  finding text

ACTION REQUIRED
---------------
* Missing residential rates rebate
  finding text
  Estimated saving: R238.62/month

NOTES
-----
* Sewerage billing method
  finding text

SUMMARY
-------
Insights: 3 (1 critical, 1 action required, 0 attention, 1 info)
Estimated recoverable: R238.62
";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_render_empty_analysis() {
        let analysis = BillAnalysis {
            account_number: None,
            bill_date: None,
            classification: PropertyClass::Unknown,
            current_charges_cents: None,
            insights: vec![],
            verifications: vec![],
            summary: Summary::default(),
        };
        let report = render(&analysis);
        assert!(report.contains("Account: -"));
        assert!(report.contains("Insights: 0 (0 critical, 0 action required, 0 attention, 0 info)"));
        assert!(report.contains("Estimated recoverable: R0.00"));
        assert!(!report.contains("CRITICAL"));
        assert!(!report.contains("CHARGE VERIFICATION"));
    }
}
