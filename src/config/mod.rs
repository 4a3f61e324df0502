//! Layered configuration for the orchestrator.
//!
//! Values are merged from programmatic defaults, an optional YAML file, and
//! `ATELIER_`-prefixed environment variables (nested keys separated by
//! `__`), then validated. See [`ConfigLoader`].

mod loader;

pub use loader::{ConfigError, ConfigLoader, DEFAULT_CONFIG_PATH, ENV_PREFIX};

use crate::orchestrator::OrchestratorSettings;
use crate::sandbox::{domain::PackageManager, services::ProvisionerSettings};
use crate::task::domain::MaxDuration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Branch name resolution.
    pub branch_name: BranchNameConfig,
    /// Seconds before the deadline at which a timeout warning is logged.
    pub timeout_warning_lead_secs: u64,
    /// Transcript messages included in follow-up prompts.
    pub history_limit: usize,
    /// Run budget for tasks that do not set one.
    pub default_max_duration_minutes: u32,
    /// Commit identity inside sandboxes.
    pub git: GitIdentityConfig,
    /// Sandbox resources.
    pub sandbox: SandboxConfig,
    /// Per-user quota.
    pub rate_limit: RateLimitConfig,
    /// Tracing output.
    pub logging: LoggingConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            branch_name: BranchNameConfig::default(),
            timeout_warning_lead_secs: 60,
            history_limit: 5,
            default_max_duration_minutes: MaxDuration::DEFAULT.minutes(),
            git: GitIdentityConfig::default(),
            sandbox: SandboxConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Converts the document into orchestrator settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMaxDuration`] when the default run
    /// budget is out of range.
    pub fn to_settings(&self) -> Result<OrchestratorSettings, ConfigError> {
        let default_max_duration = MaxDuration::from_minutes(self.default_max_duration_minutes)
            .map_err(|_| ConfigError::InvalidMaxDuration(self.default_max_duration_minutes))?;
        Ok(OrchestratorSettings {
            branch_name_wait: Duration::from_millis(self.branch_name.wait_ms),
            branch_name_poll: Duration::from_millis(self.branch_name.poll_ms),
            timeout_warning_lead: Duration::from_secs(self.timeout_warning_lead_secs),
            history_limit: self.history_limit,
            default_max_duration,
            provisioner: ProvisionerSettings {
                git_author_name: self.git.author_name.clone(),
                git_author_email: self.git.author_email.clone(),
                default_package_manager: self.sandbox.default_package_manager,
                vcpus: self.sandbox.vcpus,
                sandbox_timeout: Duration::from_secs(self.sandbox.timeout_minutes.saturating_mul(60)),
                clone_depth: self.sandbox.clone_depth,
            },
        })
    }
}

/// How long to wait for a generated branch name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchNameConfig {
    /// Total wait in milliseconds.
    pub wait_ms: u64,
    /// Poll interval in milliseconds.
    pub poll_ms: u64,
}

impl Default for BranchNameConfig {
    fn default() -> Self {
        Self {
            wait_ms: 10_000,
            poll_ms: 500,
        }
    }
}

/// Git author used for agent commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitIdentityConfig {
    /// `user.name`.
    pub author_name: String,
    /// `user.email`.
    pub author_email: String,
}

impl Default for GitIdentityConfig {
    fn default() -> Self {
        let defaults = ProvisionerSettings::default();
        Self {
            author_name: defaults.git_author_name,
            author_email: defaults.git_author_email,
        }
    }
}

/// Sandbox sizing and setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Manager used when no lockfile is present, and for install retries.
    pub default_package_manager: PackageManager,
    /// Virtual CPUs per sandbox.
    pub vcpus: u8,
    /// Sandbox lifetime in minutes.
    pub timeout_minutes: u64,
    /// Shallow clone depth; `None` clones full history.
    pub clone_depth: Option<u32>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            default_package_manager: PackageManager::Npm,
            vcpus: 4,
            timeout_minutes: 300,
            clone_depth: Some(1),
        }
    }
}

/// Daily task quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Tasks and follow-ups allowed per user per UTC day.
    pub daily_quota: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { daily_quota: 5 }
    }
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable multi-line output.
    #[default]
    Pretty,
}

#[cfg(test)]
mod tests;
