//! Final recommendation blending.
//!
//! The last step before a result is persisted; it must produce something
//! sensible from whatever subset of inputs survived the pipeline and can
//! never fail.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::financial::FinancialScorecard;
use super::technical::TechnicalScorecard;
use crate::clients::{AiRecommendation, AiSummary, Confidence, Priority};

/// Bounded length of the strengths/concerns lists.
const LIST_LIMIT: usize = 5;

/// The consolidated bid/no-bid decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Whether to bid.
    pub should_bid: bool,
    /// Confidence in the decision.
    pub confidence: Confidence,
    /// Priority relative to other opportunities.
    pub priority: Priority,
    /// Reasons in favour, bounded.
    pub strengths: Vec<String>,
    /// Reasons against, bounded.
    pub concerns: Vec<String>,
    /// True when the decision came from the rule-based fallback rather than
    /// the AI verdict.
    pub rule_based: bool,
}

/// Blends scorecards and an optional AI verdict into a [`Recommendation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Blender;

impl Blender {
    /// Produces the final recommendation; tolerates any input being absent
    /// or partially populated.
    pub fn blend(
        &self,
        financial: &FinancialScorecard,
        technical: &TechnicalScorecard,
        ai_summary: Option<&AiSummary>,
    ) -> Recommendation {
        let recommendation = match ai_summary {
            Some(summary) => from_ai(summary),
            None => fallback(financial, technical),
        };

        debug!(
            should_bid = recommendation.should_bid,
            rule_based = recommendation.rule_based,
            "recommendation blended"
        );
        recommendation
    }
}

fn from_ai(summary: &AiSummary) -> Recommendation {
    let verdict = summary.verdict();
    Recommendation {
        should_bid: matches!(
            verdict.recommendation,
            AiRecommendation::Proceed | AiRecommendation::Consider
        ),
        confidence: verdict.confidence,
        priority: verdict.priority,
        strengths: bounded(&verdict.key_strengths),
        concerns: bounded(&verdict.key_concerns),
        rule_based: false,
    }
}

/// Rule-based fallback for when the AI service was unavailable: bid iff the
/// technical score clears 70 and the margin clears 10%.
fn fallback(financial: &FinancialScorecard, technical: &TechnicalScorecard) -> Recommendation {
    let score = technical.capability_match.overall_score;
    let margin = financial.profitability.profit_margin_percent;

    let should_bid = score >= 70.0 && margin >= 10.0;
    let confidence = if score >= 80.0 {
        Confidence::High
    } else {
        Confidence::Medium
    };
    let priority = if should_bid && margin >= 15.0 {
        Priority::High
    } else if should_bid {
        Priority::Medium
    } else {
        Priority::Low
    };

    let mut strengths = Vec::new();
    if score >= 70.0 {
        strengths.push(format!("capability match score {score:.0}"));
    }
    if margin >= 10.0 {
        strengths.push(format!("profit margin {margin:.1}%"));
    }

    let mut concerns = Vec::new();
    if score < 70.0 {
        concerns.push(format!("capability match score only {score:.0}"));
    }
    if margin < 10.0 {
        concerns.push(format!("thin profit margin {margin:.1}%"));
    }
    for risk in technical.risks.iter().take(LIST_LIMIT - concerns.len().min(LIST_LIMIT)) {
        concerns.push(risk.description.clone());
    }

    Recommendation {
        should_bid,
        confidence,
        priority,
        strengths: strengths.into_iter().take(LIST_LIMIT).collect(),
        concerns: concerns.into_iter().take(LIST_LIMIT).collect(),
        rule_based: true,
    }
}

fn bounded(items: &[String]) -> Vec<String> {
    items.iter().take(LIST_LIMIT).cloned().collect()
}
