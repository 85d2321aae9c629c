use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Cache categories, each with its own directory and time-to-live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    /// Extracted document text, keyed by folder fingerprint. TTL: 30 days.
    Documents,
    /// External search results, keyed by query fingerprint. TTL: 7 days.
    Search,
    /// Completed evaluation reports, keyed by opportunity id. TTL: 90 days.
    Analysis,
}

impl CacheCategory {
    /// All categories, in stats/clear order.
    pub const ALL: [CacheCategory; 3] = [
        CacheCategory::Documents,
        CacheCategory::Search,
        CacheCategory::Analysis,
    ];

    /// Subdirectory name under the cache root.
    pub fn dir_name(self) -> &'static str {
        match self {
            CacheCategory::Documents => "documents",
            CacheCategory::Search => "search",
            CacheCategory::Analysis => "analysis",
        }
    }

    /// Time-to-live for entries in this category.
    pub fn ttl(self) -> Duration {
        match self {
            CacheCategory::Documents => Duration::days(30),
            CacheCategory::Search => Duration::days(7),
            CacheCategory::Analysis => Duration::days(90),
        }
    }
}

impl std::fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// On-disk (and in-memory) representation of one cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    /// Category the entry belongs to.
    pub category: CacheCategory,
    /// Content fingerprint used as the key.
    pub fingerprint: String,
    /// Creation timestamp; entries expire `category.ttl()` after this.
    pub created_at: DateTime<Utc>,
    /// Cached payload.
    pub payload: serde_json::Value,
}

impl CacheEnvelope {
    /// Creates an envelope stamped with the current time.
    pub fn new(category: CacheCategory, fingerprint: String, payload: serde_json::Value) -> Self {
        Self {
            category,
            fingerprint,
            created_at: Utc::now(),
            payload,
        }
    }

    /// Returns `true` if the entry is still within its TTL at `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at < self.category.ttl()
    }
}

/// Aggregate cache statistics, by category plus total size on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entry count in the `documents` category.
    pub documents: usize,
    /// Entry count in the `search` category.
    pub search: usize,
    /// Entry count in the `analysis` category.
    pub analysis: usize,
    /// Total bytes across all entry files.
    pub total_bytes: u64,
}

impl CacheStats {
    /// Total entry count across categories.
    pub fn entry_count(&self) -> usize {
        self.documents + self.search + self.analysis
    }
}
