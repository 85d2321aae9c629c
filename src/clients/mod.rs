//! External collaborator seams.
//!
//! The engine talks to document extraction, the language model, web search,
//! and report rendering only through these traits; the wire protocols live
//! elsewhere. Mock implementations ship behind the `mock` feature so the
//! whole pipeline runs without network access.

pub mod error;
pub mod summary;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::ClientError;
pub use summary::{
    parse_ai_summary, AiRecommendation, AiSummary, AiVerdict, Confidence, Priority,
};

use crate::cost::ModelTier;

/// Text extracted from an opportunity's document folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestedDocuments {
    /// All document text, concatenated in file order.
    pub combined_text: String,
    /// File names that contributed text.
    pub files: Vec<String>,
}

/// A raw language-model completion plus its token usage.
#[derive(Debug, Clone)]
pub struct AiResponse {
    /// Model output text.
    pub text: String,
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens generated.
    pub output_tokens: u64,
}

/// Extracts text from an opportunity's local document folder.
#[async_trait]
pub trait DocumentIngestor: Send + Sync {
    /// Reads every supported document under `folder`.
    async fn ingest(&self, folder: &Path) -> Result<IngestedDocuments, ClientError>;
}

/// Language-model analysis service.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Pricing tier the client bills at.
    fn tier(&self) -> ModelTier;

    /// Runs one analysis prompt.
    async fn analyze(&self, prompt: &str) -> Result<AiResponse, ClientError>;
}

/// Web-search service for market enrichment.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Runs one search, returning provider-shaped JSON results.
    async fn search(&self, query: &str, max_results: usize)
        -> Result<serde_json::Value, ClientError>;
}

/// Renders a completed evaluation into a human-readable artifact.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Renders `report` for `opportunity_id`, returning the artifact path.
    async fn render(
        &self,
        opportunity_id: &str,
        report: &serde_json::Value,
    ) -> Result<PathBuf, ClientError>;
}
