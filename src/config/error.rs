use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading or validating configuration.
pub enum ConfigError {
    /// A numeric environment variable failed to parse.
    #[error("failed to parse {name}={value}: {source}")]
    NumberParseError {
        /// Environment variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Parse error.
        #[source]
        source: std::num::ParseFloatError,
    },

    /// The budget limit must be a positive, finite amount.
    #[error("invalid budget limit '{value}': must be a positive number")]
    InvalidBudget {
        /// Offending value.
        value: String,
    },

    /// A configured path does not exist.
    #[error("path not found: {path}")]
    PathNotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// A path expected to be a directory is something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// A path expected to be a file is something else.
    #[error("not a file: {path}")]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },
}
