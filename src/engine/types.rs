use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::AiSummary;
use crate::cost::RecordOutcome;
use crate::evaluators::{
    FinancialScorecard, MarketScorecard, Recommendation, TechnicalScorecard,
};

/// The consolidated result of one completed evaluation.
///
/// Persisted into the `analysis` cache category keyed by opportunity id, and
/// served to callers through the task table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Opportunity evaluated.
    pub opportunity_id: String,
    /// When the evaluation finished.
    pub generated_at: DateTime<Utc>,
    /// Files that contributed document text.
    pub document_files: Vec<String>,
    /// AI summary, absent when the service was unavailable or skipped.
    pub ai_summary: Option<AiSummary>,
    /// True when the paid AI call was skipped because the month was over
    /// budget and the hard stop is configured.
    pub ai_skipped_over_budget: bool,
    /// Financial scorecard.
    pub financial: FinancialScorecard,
    /// Technical scorecard.
    pub technical: TechnicalScorecard,
    /// Market scorecard.
    pub market: MarketScorecard,
    /// Final recommendation.
    pub recommendation: Recommendation,
    /// Spend recorded for this evaluation and the month's budget standing.
    pub cost: RecordOutcome,
}

/// Outcome of an evaluation start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    /// A worker was spawned.
    Accepted,
    /// An evaluation for this opportunity is already in flight.
    Conflict,
}

/// One entry in a batch evaluation request.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    /// Opportunity identifier.
    pub opportunity_id: String,
    /// Listing title, used in prompts and search queries.
    pub title: String,
    /// Local folder holding the opportunity's documents.
    pub folder: std::path::PathBuf,
}
