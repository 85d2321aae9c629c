use std::path::PathBuf;
use thiserror::Error;

use crate::clients::ClientError;

/// Fatal per-task errors.
///
/// Anything here ends the task in the `Error` state with the message
/// attached; degradable failures (AI, search, rendering) never reach this
/// type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The opportunity's document folder could not be fingerprinted.
    #[error("document folder unreadable at {path}: {source}")]
    DocumentFolder {
        /// Folder that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Document ingestion failed and no cached text exists.
    #[error("document ingestion failed: {0}")]
    Ingestion(#[from] ClientError),

    /// A required collaborator call exceeded its per-call timeout.
    #[error("step '{step}' timed out")]
    Timeout {
        /// Step that timed out.
        step: &'static str,
    },
}
