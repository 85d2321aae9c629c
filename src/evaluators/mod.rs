//! Opportunity evaluators.
//!
//! Financial, technical, and market assessments are independent of each
//! other; each is a pure function over the opportunity's extracted text plus
//! optional structured hints, producing an immutable scorecard. The blender
//! folds the scorecards and an optional AI verdict into the final
//! recommendation.

pub mod blend;
pub mod extract;
pub mod financial;
pub mod market;
pub mod technical;


use serde::{Deserialize, Serialize};

pub use blend::{Blender, Recommendation};
pub use extract::{Extractor, ProjectType};
pub use financial::{FinancialEvaluator, FinancialScorecard};
pub use market::{FindingSource, MarketEvaluator, MarketScorecard};
pub use technical::{TechnicalEvaluator, TechnicalScorecard};

/// One opportunity as the evaluators see it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Opportunity {
    /// Stable opportunity identifier.
    pub id: String,
    /// Listing title.
    pub title: String,
    /// Combined extracted document text.
    pub text: String,
}

/// Structured requirements supplied by an upstream extraction (usually the
/// AI client), overriding the regex heuristics when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementHints {
    /// Required certification names.
    pub certifications: Vec<String>,
    /// Required classification codes.
    pub classification_codes: Vec<String>,
    /// Required years of experience.
    pub experience_years: Option<u32>,
    /// Required technologies.
    pub technologies: Vec<String>,
    /// Required team size.
    pub team_size: Option<u32>,
    /// Stated budget in SAR.
    pub budget: Option<f64>,
    /// Stated duration in months.
    pub duration_months: Option<u32>,
}

impl RequirementHints {
    /// Lenient conversion from an AI-supplied JSON object.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        value
            .as_object()
            .and_then(|_| serde_json::from_value(value.clone()).ok())
    }
}
