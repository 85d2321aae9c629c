use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by external collaborators.
///
/// The orchestrator treats most of these as degradations (run without AI
/// hints, use placeholder market data) rather than task failures.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service could not be reached or refused the call.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something unusable.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Local filesystem error while ingesting or rendering.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
