use std::path::PathBuf;
use thiserror::Error;

/// Internal cache errors.
///
/// These never escape the public [`super::ContentCache`] API: read faults
/// degrade to misses and write faults are logged and swallowed, so a cache
/// problem can never fail an evaluation.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem error.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Envelope (de)serialization error.
    #[error("cache envelope serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result type for internal cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
