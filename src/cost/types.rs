use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rounds a monetary amount to 4 decimal places.
///
/// Applied at every computation point so repeated summation cannot
/// accumulate floating-point drift.
#[inline]
pub fn round4(amount: f64) -> f64 {
    (amount * 10_000.0).round() / 10_000.0
}

/// Language-model pricing tier.
///
/// Unknown tier names fall back to [`ModelTier::Standard`], the documented
/// default, rather than erroring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// Frontier general-purpose model ($3 / $15 per 1M tokens).
    #[default]
    Standard,
    /// Small fast model ($0.25 / $1.25 per 1M tokens).
    Economy,
    /// Premium-priced model ($5 / $15 per 1M tokens).
    Premium,
}

impl ModelTier {
    /// Per-million-token rates `(input, output)` in USD.
    pub fn rates(self) -> (f64, f64) {
        match self {
            ModelTier::Standard => (3.00, 15.00),
            ModelTier::Economy => (0.25, 1.25),
            ModelTier::Premium => (5.00, 15.00),
        }
    }

    /// Parses a tier name, falling back to the default tier when unknown.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "standard" => ModelTier::Standard,
            "economy" => ModelTier::Economy,
            "premium" => ModelTier::Premium,
            _ => ModelTier::default(),
        }
    }
}

/// Cost of a web-search call, in USD.
pub const SEARCH_COST_PER_CALL: f64 = 0.005;

/// Language-model usage and its estimated cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens generated.
    pub output_tokens: u64,
    /// Estimated cost in USD.
    pub cost: f64,
}

/// Web-search usage and its estimated cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchUsage {
    /// Number of searches performed.
    pub num_searches: u32,
    /// Estimated cost in USD.
    pub cost: f64,
}

/// Per-service cost breakdown for one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Language-model usage.
    pub model: ModelUsage,
    /// Web-search usage.
    pub search: SearchUsage,
    /// Total cost in USD.
    pub total: f64,
}

impl CostBreakdown {
    /// Builds a breakdown, computing the rounded total.
    pub fn new(model: ModelUsage, search: SearchUsage) -> Self {
        Self {
            model,
            search,
            total: round4(model.cost + search.cost),
        }
    }
}

/// One appended ledger record per completed evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRecord {
    /// Opportunity the evaluation was for.
    pub opportunity_id: String,
    /// When the evaluation was recorded.
    pub timestamp: DateTime<Utc>,
    /// Month key, `YYYY-MM`.
    pub month: String,
    /// Per-service breakdown.
    pub costs: CostBreakdown,
}

/// Persisted ledger: running total, month aggregates, chronological records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostLedger {
    /// All-time total cost.
    pub total_cost: f64,
    /// Month key → aggregate cost.
    pub monthly_costs: BTreeMap<String, f64>,
    /// Chronological record list (append-only).
    pub records: Vec<CostRecord>,
}

/// Budget classification for the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    /// Below 80% of the monthly limit.
    Ok,
    /// At 80–99% of the monthly limit.
    Warning,
    /// At or over the monthly limit.
    Critical,
}

/// Informational budget warning attached to a record outcome.
///
/// Never blocks recording; the governor reports, it does not enforce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetWarning {
    /// Severity level.
    pub level: BudgetLevel,
    /// Human-readable message.
    pub message: String,
    /// Suggested action.
    pub action: String,
}

/// Result of recording one evaluation's costs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOutcome {
    /// Opportunity the costs belong to.
    pub opportunity_id: String,
    /// Cost of this evaluation.
    pub analysis_cost: f64,
    /// Aggregate spend for the current month, including this record.
    pub monthly_total: f64,
    /// Configured monthly limit.
    pub monthly_budget: f64,
    /// Percentage of the limit used, one decimal place.
    pub percentage_used: f64,
    /// Present at warning (≥80%) or critical (≥100%) levels.
    pub warning: Option<BudgetWarning>,
}

/// Aggregate summary for one month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Month key, `YYYY-MM`.
    pub month: String,
    /// Aggregate cost for the month.
    pub total_cost: f64,
    /// Configured monthly limit.
    pub budget_limit: f64,
    /// Percentage of the limit used.
    pub percentage_used: f64,
    /// Number of evaluations recorded in the month.
    pub num_analyses: usize,
    /// Mean cost per evaluation.
    pub avg_cost_per_analysis: f64,
    /// Model spend within the month.
    pub model_cost: f64,
    /// Search spend within the month.
    pub search_cost: f64,
    /// Limit minus aggregate (may be negative).
    pub budget_remaining: f64,
    /// Budget classification.
    pub status: BudgetLevel,
}

/// All-time aggregate summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalSummary {
    /// All-time total cost.
    pub total_cost: f64,
    /// All-time evaluation count.
    pub num_analyses: usize,
    /// Mean cost per evaluation.
    pub avg_cost_per_analysis: f64,
    /// All-time model spend.
    pub model_cost: f64,
    /// All-time search spend.
    pub search_cost: f64,
    /// Number of months with any spend.
    pub months_tracked: usize,
    /// Summary for the current month.
    pub current_month: MonthlySummary,
}
