//! Financial evaluation: cost modelling, pricing options, and bid policy.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::extract::{Extractor, ProjectType};
use super::{Opportunity, RequirementHints};
use crate::cost::round4;
use crate::profile::PricingStrategy;

/// Flat licensing allowance when the text implies special permits.
const LICENSING_ALLOWANCE: f64 = 50_000.0;

/// Estimated delivery cost, by component.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProjectCostEstimate {
    /// Team size × monthly salary × duration.
    pub labor: f64,
    /// Materials and supplies, scaled off labor by project type.
    pub materials: f64,
    /// Equipment rental (construction work only).
    pub equipment: f64,
    /// Specialized subcontractor services.
    pub subcontractors: f64,
    /// Licenses and certifications.
    pub licensing: f64,
    /// Sum of the direct components above.
    pub subtotal: f64,
    /// Overhead loading on the subtotal.
    pub overhead: f64,
    /// Contingency reserve on the subtotal.
    pub contingency: f64,
    /// Fully loaded cost.
    pub total: f64,
}

/// Prices at each margin tier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PricingOptions {
    /// Cost × (1 + minimum margin).
    pub minimum_price: f64,
    /// Cost × (1 + target margin).
    pub target_price: f64,
    /// Cost × (1 + premium margin).
    pub maximum_price: f64,
}

/// How the recommended bid was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStrategy {
    /// Budget covers the target price; bid target.
    Competitive,
    /// Budget covers only a reduced margin; bid 95% of budget.
    Aggressive,
    /// Stated budget is below the minimum viable price.
    InsufficientBudget,
    /// No budget known; bid target.
    TargetByDefault,
}

/// The bid the evaluator recommends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BidRecommendation {
    /// Recommended bid amount, SAR.
    pub amount: f64,
    /// Strategy behind the amount.
    pub strategy: BidStrategy,
}

/// Expected return at the recommended bid.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Profitability {
    /// Bid minus cost.
    pub expected_profit: f64,
    /// Profit as a percentage of the bid.
    pub profit_margin_percent: f64,
    /// Profit as a percentage of the cost.
    pub roi_percent: f64,
    /// The fully loaded cost; bidding below this loses money.
    pub break_even_price: f64,
}

/// Full financial scorecard for one opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialScorecard {
    /// Detected project type.
    pub project_type: ProjectType,
    /// Estimated team size.
    pub team_size: u32,
    /// Estimated duration in months.
    pub duration_months: u32,
    /// Budget stated in the documents, when found.
    pub stated_budget: Option<f64>,
    /// Cost estimate.
    pub cost: ProjectCostEstimate,
    /// Margin-tier prices.
    pub pricing: PricingOptions,
    /// Recommended bid.
    pub bid: BidRecommendation,
    /// Return metrics at the recommended bid.
    pub profitability: Profitability,
    /// Advisory notes for the reviewer.
    pub notes: Vec<String>,
}

/// Rule-based financial evaluator.
///
/// Pure: same opportunity text and hints always produce the same scorecard,
/// and empty text produces a defaults-driven one rather than an error.
pub struct FinancialEvaluator {
    strategy: PricingStrategy,
    extractor: Extractor,
}

impl FinancialEvaluator {
    /// Creates an evaluator priced by `strategy`.
    pub fn new(strategy: PricingStrategy) -> Self {
        Self {
            strategy,
            extractor: Extractor,
        }
    }

    /// Evaluates one opportunity.
    pub fn evaluate(
        &self,
        opportunity: &Opportunity,
        hints: Option<&RequirementHints>,
    ) -> FinancialScorecard {
        let text = &opportunity.text;

        let project_type = self.extractor.project_type(text);
        let duration_months = hints
            .and_then(|h| h.duration_months)
            .unwrap_or_else(|| self.extractor.duration_months(text));
        let stated_budget = hints
            .and_then(|h| h.budget)
            .or_else(|| self.extractor.stated_budget(text));

        let mut team_size = project_type.base_team_size();
        if self.extractor.large_scope(text) {
            team_size = (team_size as f64 * 1.5) as u32;
        }

        let cost = self.estimate_cost(text, project_type, team_size, duration_months);
        let pricing = self.pricing_options(cost.total);
        let bid = recommend_bid(&pricing, stated_budget);
        let profitability = profitability(cost.total, bid.amount);
        let notes = advisory_notes(&cost, &bid, &profitability, stated_budget);

        debug!(
            opportunity_id = %opportunity.id,
            ?project_type,
            total_cost = cost.total,
            recommended_bid = bid.amount,
            "financial evaluation complete"
        );

        FinancialScorecard {
            project_type,
            team_size,
            duration_months,
            stated_budget,
            cost,
            pricing,
            bid,
            profitability,
            notes,
        }
    }

    fn estimate_cost(
        &self,
        text: &str,
        project_type: ProjectType,
        team_size: u32,
        duration_months: u32,
    ) -> ProjectCostEstimate {
        let labor = team_size as f64
            * self.strategy.average_monthly_salary
            * duration_months as f64;

        let (materials, equipment) = match project_type {
            ProjectType::It => (labor * 0.3, 0.0),
            ProjectType::Construction => (labor * 0.5, labor * 0.2),
            _ => (labor * 0.2, 0.0),
        };
        let subcontractors = if self.extractor.needs_subcontractors(text) {
            labor * 0.3
        } else {
            0.0
        };
        let licensing = if self.extractor.needs_licensing(text) {
            LICENSING_ALLOWANCE
        } else {
            0.0
        };

        let subtotal = labor + materials + equipment + subcontractors + licensing;
        let overhead = subtotal * self.strategy.overhead_rate;
        let contingency = subtotal * self.strategy.contingency_rate;

        ProjectCostEstimate {
            labor: round4(labor),
            materials: round4(materials),
            equipment: round4(equipment),
            subcontractors: round4(subcontractors),
            licensing: round4(licensing),
            subtotal: round4(subtotal),
            overhead: round4(overhead),
            contingency: round4(contingency),
            total: round4(subtotal + overhead + contingency),
        }
    }

    /// Margin-tier prices for a known fully loaded cost.
    pub fn pricing_options(&self, total_cost: f64) -> PricingOptions {
        PricingOptions {
            minimum_price: round4(total_cost * (1.0 + self.strategy.minimum_margin)),
            target_price: round4(total_cost * (1.0 + self.strategy.target_margin)),
            maximum_price: round4(total_cost * (1.0 + self.strategy.premium_margin)),
        }
    }
}

/// Bid policy: target when the budget covers it, 95% of budget at a reduced
/// margin, minimum viable when the budget falls short, target when unknown.
pub fn recommend_bid(pricing: &PricingOptions, stated_budget: Option<f64>) -> BidRecommendation {
    match stated_budget {
        Some(budget) if budget >= pricing.target_price => BidRecommendation {
            amount: pricing.target_price,
            strategy: BidStrategy::Competitive,
        },
        Some(budget) if budget >= pricing.minimum_price => BidRecommendation {
            amount: round4(budget * 0.95),
            strategy: BidStrategy::Aggressive,
        },
        Some(_) => BidRecommendation {
            amount: pricing.minimum_price,
            strategy: BidStrategy::InsufficientBudget,
        },
        None => BidRecommendation {
            amount: pricing.target_price,
            strategy: BidStrategy::TargetByDefault,
        },
    }
}

fn profitability(total_cost: f64, bid: f64) -> Profitability {
    let profit = bid - total_cost;
    Profitability {
        expected_profit: round4(profit),
        profit_margin_percent: if bid > 0.0 {
            round4(profit / bid * 100.0)
        } else {
            0.0
        },
        roi_percent: if total_cost > 0.0 {
            round4(profit / total_cost * 100.0)
        } else {
            0.0
        },
        break_even_price: round4(total_cost),
    }
}

fn advisory_notes(
    cost: &ProjectCostEstimate,
    bid: &BidRecommendation,
    profitability: &Profitability,
    stated_budget: Option<f64>,
) -> Vec<String> {
    let mut notes = Vec::new();

    if profitability.profit_margin_percent < 10.0 {
        notes.push("low profit margin; weigh carefully before bidding".to_string());
    } else if profitability.profit_margin_percent >= 20.0 {
        notes.push("healthy profit margin".to_string());
    }

    if let Some(budget) = stated_budget {
        if bid.amount > budget * 1.1 {
            notes.push("estimated cost significantly exceeds the stated budget".to_string());
        } else if bid.amount <= budget {
            notes.push("recommended bid fits within the stated budget".to_string());
        }
    } else {
        notes.push("no budget stated in the documents; bidding at target margin".to_string());
    }

    if bid.strategy == BidStrategy::InsufficientBudget {
        notes.push("stated budget is below the minimum viable price".to_string());
    }

    if cost.labor > cost.subtotal * 0.6 {
        notes.push("labor dominates the cost; consider optimizing team size".to_string());
    }
    if cost.subcontractors > 0.0 {
        notes.push("subcontractor rates are negotiable; budget assumes list pricing".to_string());
    }

    notes
}
