//! Figment-backed configuration loading.

use super::OrchestratorConfig;
use crate::task::domain::MaxDuration;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use std::path::Path;
use thiserror::Error;

/// Project configuration file consulted by [`ConfigLoader::load`].
pub const DEFAULT_CONFIG_PATH: &str = ".atelier/config.yaml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "ATELIER_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration could not be loaded or is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider failed or a value had the wrong shape.
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// The branch name poll interval was zero.
    #[error("branch_name.poll_ms must be at least 1")]
    InvalidPollInterval,

    /// The poll interval exceeded the total wait.
    #[error("branch_name.poll_ms ({poll_ms}) must not exceed branch_name.wait_ms ({wait_ms})")]
    PollLongerThanWait {
        /// Configured interval.
        poll_ms: u64,
        /// Configured wait.
        wait_ms: u64,
    },

    /// The default run budget is outside the accepted range.
    #[error("default_max_duration_minutes must be between 1 and {max}, got {0}", max = MaxDuration::MAX_MINUTES)]
    InvalidMaxDuration(u32),

    /// No transcript context would be sent with follow-ups.
    #[error("history_limit must be at least 1")]
    InvalidHistoryLimit,

    /// Sandboxes need at least one CPU.
    #[error("sandbox.vcpus must be at least 1")]
    InvalidVcpus,

    /// The git identity is incomplete.
    #[error("git author name and email must not be empty")]
    EmptyGitIdentity,

    /// The log level is unknown.
    #[error("invalid log level: {0}; expected one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Loads [`OrchestratorConfig`] with hierarchical merging.
///
/// Precedence, lowest first:
/// 1. programmatic defaults
/// 2. the YAML file
/// 3. `ATELIER_*` environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads from [`DEFAULT_CONFIG_PATH`] and the environment.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when extraction or validation fails.
    pub fn load() -> Result<OrchestratorConfig, ConfigError> {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Loads from `path` and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when extraction or validation fails.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<OrchestratorConfig, ConfigError> {
        let config = Self::figment(path.as_ref())
            .extract::<OrchestratorConfig>()
            .map_err(Box::new)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Returns the provider stack without extracting it.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(OrchestratorConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(config: &OrchestratorConfig) -> Result<(), ConfigError> {
        let branch = &config.branch_name;
        if branch.poll_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        if branch.poll_ms > branch.wait_ms {
            return Err(ConfigError::PollLongerThanWait {
                poll_ms: branch.poll_ms,
                wait_ms: branch.wait_ms,
            });
        }
        if MaxDuration::from_minutes(config.default_max_duration_minutes).is_err() {
            return Err(ConfigError::InvalidMaxDuration(
                config.default_max_duration_minutes,
            ));
        }
        if config.history_limit == 0 {
            return Err(ConfigError::InvalidHistoryLimit);
        }
        if config.sandbox.vcpus == 0 {
            return Err(ConfigError::InvalidVcpus);
        }
        if config.git.author_name.trim().is_empty() || config.git.author_email.trim().is_empty() {
            return Err(ConfigError::EmptyGitIdentity);
        }
        if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        Ok(())
    }
}
