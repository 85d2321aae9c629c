use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a company profile from disk.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Profile file could not be read.
    #[error("profile file unreadable at {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Profile file is not valid JSON for the expected shape.
    #[error("profile file malformed at {path}: {source}")]
    Malformed {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}
