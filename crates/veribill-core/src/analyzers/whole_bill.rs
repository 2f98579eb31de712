//! Whole-bill analyzer
//!
//! Checks that look at the statement as a whole: the arrears balance and
//! interest accrual.

use crate::markers::Marker;
use crate::models::format_rand;

use super::engine::{AnalysisContext, BillAnalyzer};
use super::types::{AnalyzerKind, Insight, Severity};

pub struct WholeBillAnalyzer;

impl WholeBillAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WholeBillAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BillAnalyzer for WholeBillAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::WholeBill
    }

    fn name(&self) -> &'static str {
        "Whole bill"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mut insights = vec![];

        if let Some(previous) = ctx.bill.previous_balance_cents {
            if previous > ctx.config.arrears_critical_cents {
                insights.push(
                    Insight::new(
                        self.id(),
                        Severity::Critical,
                        "Large arrears balance",
                        format!(
                            "The account carries {} in arrears from previous periods.",
                            format_rand(previous)
                        ),
                    )
                    .with_implication(
                        "Arrears at this level risk credit-control action, including \
                         disconnection and attachment of the property.",
                    )
                    .with_action(
                        "Contact the municipality about a debt-relief or repayment \
                         arrangement before credit control escalates.",
                    ),
                );
            }
        }

        if ctx.has(Marker::InterestOnArrears) {
            insights.push(
                Insight::new(
                    self.id(),
                    Severity::Attention,
                    "Interest accruing on arrears",
                    "The statement charges interest on the outstanding balance.",
                )
                .with_implication(
                    "Interest compounds monthly: the longer the arrears stand, the \
                     faster the balance grows.",
                )
                .with_action("Settle or arrange the arrears to stop the interest."),
            );
        }

        insights
    }
}
