//! Bidscope library crate (used by the demo binary and integration tests).
//!
//! Bidscope evaluates procurement opportunities end to end: it ingests
//! extracted document text, obtains language-model and rule-based
//! assessments of financial and technical fit, enriches them with external
//! market data, and produces a bid/no-bid recommendation — without redoing
//! expensive work (content-addressed caching) and without overspending a
//! metered monthly budget (cost governor).
//!
//! # Public API Surface
//!
//! - [`Config`], [`ConfigError`] — environment-backed configuration
//! - [`ContentCache`], [`CacheCategory`] — category-scoped content cache
//! - [`CostGovernor`], [`ModelTier`], [`BudgetLevel`] — spend ledger and
//!   budget classification
//! - [`CompanyProfile`] — immutable bidding-company profile
//! - [`clients`] — collaborator traits and the tolerant AI-summary parser
//! - [`evaluators`] — financial / technical / market scorecards and the
//!   blender
//! - [`EvaluationEngine`], [`StartOutcome`], [`TaskStatus`] — the task
//!   orchestrator
//!
//! Mock collaborators are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod clients;
pub mod config;
pub mod cost;
pub mod engine;
pub mod evaluators;
pub mod hashing;
pub mod profile;

pub use cache::{CacheCategory, CacheStats, ContentCache};
pub use clients::{
    AiClient, AiSummary, AiVerdict, ClientError, Confidence, DocumentIngestor, Priority,
    ReportRenderer, SearchClient, parse_ai_summary,
};
pub use config::{Config, ConfigError};
pub use cost::{
    BudgetLevel, CostBreakdown, CostGovernor, ModelTier, estimate_model_cost,
    estimate_search_cost,
};
pub use engine::{
    Collaborators, EvaluationEngine, EvaluationReport, EvaluationRequest, StartOutcome,
    TaskStatus, TaskView,
};
pub use evaluators::{
    Blender, Extractor, FinancialEvaluator, FinancialScorecard, MarketEvaluator, MarketScorecard,
    Opportunity, Recommendation, RequirementHints, TechnicalEvaluator, TechnicalScorecard,
};
pub use hashing::{fingerprint_folder, fingerprint_query, hash_bytes};
pub use profile::{CompanyProfile, PricingStrategy, ProfileError};
