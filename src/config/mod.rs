//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `BIDSCOPE_*` environment
//! variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `BIDSCOPE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for persisted engine state (cost ledger, reports).
    /// Default: `./data`.
    pub data_dir: PathBuf,

    /// Root directory of the content cache. Default: `./data/cache`.
    pub cache_dir: PathBuf,

    /// Path to the company profile JSON. Optional; evaluators fall back to
    /// built-in defaults when absent.
    pub profile_path: Option<PathBuf>,

    /// Monthly budget for metered external calls, in USD. Default: `100.0`.
    pub monthly_budget_limit: f64,

    /// When `true`, the orchestrator skips the paid AI call while the
    /// current month is over budget (tasks still complete in degraded mode).
    /// Default: `false` — the governor only ever warns.
    pub hard_budget_stop: bool,

    /// Timeout applied to each outbound collaborator call.
    /// Default: 60 seconds.
    pub call_timeout: Duration,

    /// Delay between worker starts in batch evaluation. Default: 2 seconds.
    pub batch_stagger: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            cache_dir: PathBuf::from("./data/cache"),
            profile_path: None,
            monthly_budget_limit: 100.0,
            hard_budget_stop: false,
            call_timeout: Duration::from_secs(60),
            batch_stagger: Duration::from_secs(2),
        }
    }
}

impl Config {
    const ENV_DATA_DIR: &'static str = "BIDSCOPE_DATA_DIR";
    const ENV_CACHE_DIR: &'static str = "BIDSCOPE_CACHE_DIR";
    const ENV_PROFILE_PATH: &'static str = "BIDSCOPE_PROFILE_PATH";
    const ENV_BUDGET_LIMIT: &'static str = "BIDSCOPE_BUDGET_LIMIT";
    const ENV_HARD_BUDGET_STOP: &'static str = "BIDSCOPE_HARD_BUDGET_STOP";
    const ENV_CALL_TIMEOUT_SECS: &'static str = "BIDSCOPE_CALL_TIMEOUT_SECS";
    const ENV_BATCH_STAGGER_MS: &'static str = "BIDSCOPE_BATCH_STAGGER_MS";

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let data_dir = Self::parse_path_from_env(Self::ENV_DATA_DIR, defaults.data_dir);
        let cache_dir = Self::parse_path_from_env(Self::ENV_CACHE_DIR, defaults.cache_dir);
        let profile_path = Self::parse_optional_path_from_env(Self::ENV_PROFILE_PATH);
        let monthly_budget_limit =
            Self::parse_budget_from_env(defaults.monthly_budget_limit)?;
        let hard_budget_stop = Self::parse_bool_from_env(
            Self::ENV_HARD_BUDGET_STOP,
            defaults.hard_budget_stop,
        );
        let call_timeout = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_CALL_TIMEOUT_SECS,
            defaults.call_timeout.as_secs(),
        ));
        let batch_stagger = Duration::from_millis(Self::parse_u64_from_env(
            Self::ENV_BATCH_STAGGER_MS,
            defaults.batch_stagger.as_millis() as u64,
        ));

        Ok(Self {
            data_dir,
            cache_dir,
            profile_path,
            monthly_budget_limit,
            hard_budget_stop,
            call_timeout,
            batch_stagger,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.exists() && !self.data_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.data_dir.clone(),
            });
        }

        if self.cache_dir.exists() && !self.cache_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.cache_dir.clone(),
            });
        }

        if let Some(ref path) = self.profile_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if !self.monthly_budget_limit.is_finite() || self.monthly_budget_limit <= 0.0 {
            return Err(ConfigError::InvalidBudget {
                value: self.monthly_budget_limit.to_string(),
            });
        }

        Ok(())
    }

    fn parse_budget_from_env(default: f64) -> Result<f64, ConfigError> {
        match env::var(Self::ENV_BUDGET_LIMIT) {
            Ok(value) => {
                let limit: f64 =
                    value
                        .parse()
                        .map_err(|e| ConfigError::NumberParseError {
                            name: Self::ENV_BUDGET_LIMIT,
                            value: value.clone(),
                            source: e,
                        })?;

                if !limit.is_finite() || limit <= 0.0 {
                    return Err(ConfigError::InvalidBudget { value });
                }

                Ok(limit)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .ok()
            .map(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
            .unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
