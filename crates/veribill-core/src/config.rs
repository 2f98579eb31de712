//! Analysis configuration
//!
//! Every threshold and estimate factor used by the analyzers and the
//! verification engine lives here so nothing is hard-coded inline.

/// Tunable thresholds and factors for bill analysis
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Billing days assumed when the statement does not state a reading period
    pub default_billing_days: u32,
    /// Residential daily electricity use above this (kWh/day) draws attention
    pub residential_daily_kwh_limit: f64,
    /// Residential daily water use above this (kL/day) suggests a leak
    pub residential_daily_kl_limit: f64,
    /// Per-unit daily water use above this (kL/day) draws attention on
    /// multi-unit properties
    pub per_unit_daily_kl_limit: f64,

    /// Annual business rate-in-the-rand estimate factor
    pub business_rate_factor: f64,
    /// Annual residential rate-in-the-rand estimate factor
    pub residential_rate_factor: f64,
    /// First portion of a residential valuation exempt from rates (cents)
    pub residential_rates_exemption_cents: i64,
    /// Minimum business-vs-residential monthly difference worth flagging (cents)
    pub rates_reclass_savings_threshold_cents: i64,
    /// Estimated monthly saving when the residential rebate is missing (cents)
    pub rebate_monthly_savings_cents: i64,
    /// Rate-in-the-rand above which a rates line implies a business tariff
    pub business_rate_used_threshold: f64,

    /// Previous balance above this (cents) is flagged as critical arrears
    pub arrears_critical_cents: i64,
    /// Business refuse bin counts at or above this get a cost note
    pub refuse_bin_note_threshold: u32,

    /// Relative tolerance when comparing a computed tariff amount to the
    /// billed amount
    pub tolerance_percent: f64,
    /// Absolute tolerance floor (cents); absorbs rounding on small charges
    pub tolerance_floor_cents: i64,
    /// Confidence multiplier for tariff rules not yet admin-verified
    pub unverified_rule_confidence_scale: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_billing_days: 30,
            residential_daily_kwh_limit: 50.0,
            residential_daily_kl_limit: 2.0,
            per_unit_daily_kl_limit: 1.5,
            // CoJ 2025/26 property rates (annual, rate-in-the-rand)
            business_rate_factor: 0.023_862_0,
            residential_rate_factor: 0.009_544_7,
            residential_rates_exemption_cents: 30_000_000, // R300 000
            rates_reclass_savings_threshold_cents: 50_000, // R500/month
            rebate_monthly_savings_cents: 23_862,          // R238.62/month
            business_rate_used_threshold: 0.015,
            arrears_critical_cents: 10_000_000, // R100 000
            refuse_bin_note_threshold: 5,
            tolerance_percent: 0.01,
            tolerance_floor_cents: 100, // R1
            unverified_rule_confidence_scale: 0.8,
        }
    }
}

impl AnalysisConfig {
    /// Comparison tolerance in cents for a billed amount:
    /// 1% of the charge or R1, whichever is larger.
    pub fn tolerance_cents(&self, billed_cents: i64) -> i64 {
        let relative = (billed_cents.abs() as f64 * self.tolerance_percent).round() as i64;
        relative.max(self.tolerance_floor_cents)
    }
}
