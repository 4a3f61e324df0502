//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user who owns a task.
///
/// Owner identifiers are issued by the authentication layer and are opaque to
/// the orchestrator; only emptiness is validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a validated owner identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyOwnerId`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyOwnerId);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clone URL of the repository a task operates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryUrl(String);

impl RepositoryUrl {
    /// Creates a validated repository URL.
    ///
    /// Accepts `https://`, `http://` and `git@host:owner/repo` forms.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidRepositoryUrl`] for any other shape
    /// or when the value contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let has_scheme = normalized.starts_with("https://")
            || normalized.starts_with("http://")
            || normalized.starts_with("git@");
        let has_path = normalized
            .split_once("://")
            .map_or(normalized.contains(':'), |(_, rest)| rest.contains('/'));

        if !has_scheme || !has_path || normalized.chars().any(char::is_whitespace) {
            return Err(TaskDomainError::InvalidRepositoryUrl(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the bare repository name (`https://host/o/r.git` → `r`).
    #[must_use]
    pub fn repository_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        let last = trimmed
            .rsplit(['/', ':'])
            .next()
            .unwrap_or(trimmed);
        last.strip_suffix(".git").unwrap_or(last)
    }
}

impl AsRef<str> for RepositoryUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RepositoryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task completion percentage in the inclusive range `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Progress(u8);

impl Progress {
    /// No progress has been made.
    pub const ZERO: Self = Self(0);

    /// The run has finished.
    pub const COMPLETE: Self = Self(100);

    /// Creates a validated progress value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidProgress`] when the value exceeds 100.
    pub const fn new(value: u8) -> Result<Self, TaskDomainError> {
        if value > 100 {
            return Err(TaskDomainError::InvalidProgress(value));
        }
        Ok(Self(value))
    }

    /// Creates a progress value, saturating at 100.
    #[must_use]
    pub const fn saturating(value: u8) -> Self {
        if value > 100 { Self::COMPLETE } else { Self(value) }
    }

    /// Returns the numeric percentage.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Progress {
    type Error = TaskDomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Progress> for u8 {
    fn from(progress: Progress) -> Self {
        progress.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Wall-clock budget for one task run, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MaxDuration(u32);

impl MaxDuration {
    /// Largest accepted budget (one day).
    pub const MAX_MINUTES: u32 = 24 * 60;

    /// Budget applied when none is configured.
    pub const DEFAULT: Self = Self(5);

    /// Creates a validated duration budget.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidMaxDuration`] when the value is zero
    /// or exceeds [`Self::MAX_MINUTES`].
    pub const fn from_minutes(minutes: u32) -> Result<Self, TaskDomainError> {
        if minutes == 0 || minutes > Self::MAX_MINUTES {
            return Err(TaskDomainError::InvalidMaxDuration(minutes));
        }
        Ok(Self(minutes))
    }

    /// Returns the budget in minutes.
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }

    /// Returns the budget as a [`std::time::Duration`].
    #[must_use]
    pub const fn as_duration(self) -> std::time::Duration {
        std::time::Duration::from_secs(self.0 as u64 * 60)
    }
}

impl TryFrom<u32> for MaxDuration {
    type Error = TaskDomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(value)
    }
}

impl From<MaxDuration> for u32 {
    fn from(duration: MaxDuration) -> Self {
        duration.0
    }
}
