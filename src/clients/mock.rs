//! Mock collaborators for tests and the demo binary.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;

use super::error::ClientError;
use super::{AiClient, AiResponse, DocumentIngestor, IngestedDocuments, ReportRenderer, SearchClient};
use crate::cost::ModelTier;

/// Reads plain-text documents (`.txt`, `.md`) straight off the filesystem.
#[derive(Debug, Default)]
pub struct MockIngestor;

#[async_trait]
impl DocumentIngestor for MockIngestor {
    async fn ingest(&self, folder: &Path) -> Result<IngestedDocuments, ClientError> {
        let entries = std::fs::read_dir(folder).map_err(|source| ClientError::Io {
            path: folder.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| matches!(ext, "txt" | "md"))
            })
            .collect();
        paths.sort();

        let mut combined_text = String::new();
        let mut files = Vec::new();
        for path in paths {
            let text = std::fs::read_to_string(&path).map_err(|source| ClientError::Io {
                path: path.clone(),
                source,
            })?;
            if !combined_text.is_empty() {
                combined_text.push_str("\n\n");
            }
            combined_text.push_str(&text);
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                files.push(name.to_string());
            }
        }

        Ok(IngestedDocuments {
            combined_text,
            files,
        })
    }
}

enum AiMode {
    /// Canned structured JSON verdict.
    Structured,
    /// Fixed response text, e.g. prose for the keyword-fallback path.
    Fixed(String),
    /// Every call fails.
    Failing,
}

/// Language-model stand-in with scriptable behavior.
pub struct MockAiClient {
    mode: AiMode,
}

impl MockAiClient {
    /// Responds with a well-formed JSON verdict (Proceed / High / Medium).
    pub fn structured() -> Self {
        Self {
            mode: AiMode::Structured,
        }
    }

    /// Responds with exactly `text`.
    pub fn fixed(text: impl Into<String>) -> Self {
        Self {
            mode: AiMode::Fixed(text.into()),
        }
    }

    /// Fails every call with [`ClientError::Unavailable`].
    pub fn failing() -> Self {
        Self {
            mode: AiMode::Failing,
        }
    }
}

#[async_trait]
impl AiClient for MockAiClient {
    fn tier(&self) -> ModelTier {
        ModelTier::Standard
    }

    async fn analyze(&self, prompt: &str) -> Result<AiResponse, ClientError> {
        let text = match &self.mode {
            AiMode::Structured => json!({
                "recommendation": "PROCEED",
                "confidence": "High",
                "priority": "Medium",
                "executive_summary": "Strong fit for the company's core sector.",
                "key_strengths": ["Sector experience matches the requirement"],
                "key_concerns": ["Delivery timeline is tight"],
            })
            .to_string(),
            AiMode::Fixed(text) => text.clone(),
            AiMode::Failing => {
                return Err(ClientError::Unavailable("mock AI configured to fail".into()))
            }
        };

        // Rough 4-chars-per-token estimate keeps costs nonzero and stable.
        Ok(AiResponse {
            input_tokens: (prompt.len() / 4) as u64,
            output_tokens: (text.len() / 4) as u64,
            text,
        })
    }
}

/// Search stand-in echoing the query back with canned results.
pub struct MockSearchClient {
    failing: bool,
}

impl MockSearchClient {
    /// Answers every query with two canned results.
    pub fn new() -> Self {
        Self { failing: false }
    }

    /// Fails every call with [`ClientError::Unavailable`].
    pub fn failing() -> Self {
        Self { failing: true }
    }
}

impl Default for MockSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<serde_json::Value, ClientError> {
        if self.failing {
            return Err(ClientError::Unavailable(
                "mock search configured to fail".into(),
            ));
        }
        let results: Vec<_> = (0..max_results.min(2))
            .map(|i| {
                json!({
                    "title": format!("Result {} for {query}", i + 1),
                    "url": format!("https://example.test/{}", i + 1),
                    "content": "Mock search result body.",
                })
            })
            .collect();
        Ok(json!({ "query": query, "results": results }))
    }
}

/// Writes the report JSON next to the data directory.
pub struct MockRenderer {
    output_dir: PathBuf,
}

impl MockRenderer {
    /// Renders into `output_dir`, creating it on first use.
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }
}

#[async_trait]
impl ReportRenderer for MockRenderer {
    async fn render(
        &self,
        opportunity_id: &str,
        report: &serde_json::Value,
    ) -> Result<PathBuf, ClientError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ClientError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        let path = self.output_dir.join(format!("{opportunity_id}.report.json"));
        let bytes = serde_json::to_vec_pretty(report)
            .map_err(|e| ClientError::Malformed(e.to_string()))?;
        std::fs::write(&path, bytes).map_err(|source| ClientError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
