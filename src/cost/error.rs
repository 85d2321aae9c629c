use std::path::PathBuf;
use thiserror::Error;

/// Internal ledger persistence errors.
///
/// These never escape the public [`super::CostGovernor`] API: a ledger that
/// fails to load starts empty, and a failed save is logged and retried on
/// the next record. Losing ledger durability must not block an evaluation.
#[derive(Debug, Error)]
pub enum CostError {
    /// Filesystem error.
    #[error("ledger I/O error at {path}: {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Ledger (de)serialization error.
    #[error("ledger serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result type for internal ledger operations.
pub type CostResult<T> = Result<T, CostError>;
