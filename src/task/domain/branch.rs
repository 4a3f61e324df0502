//! Branch-name value objects for the branch a task publishes to.

use super::{TaskDomainError, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a validated branch name.
const MAX_BRANCH_NAME_LENGTH: usize = 200;

/// Characters rejected by `git check-ref-format` that we refuse up front.
const FORBIDDEN_CHARS: [char; 9] = [':', '~', '^', '?', '*', '[', '\\', ' ', '\t'];

/// Prefix for names generated when no AI-generated name is available.
const FALLBACK_PREFIX: &str = "atelier";

/// Validated Git branch name.
///
/// Branch names must be non-empty after trimming, must not start with `-` or
/// `/`, must not contain `..` or characters forbidden in git refs, and must not
/// exceed `MAX_BRANCH_NAME_LENGTH` characters.
///
/// # Examples
///
///     use atelier::task::domain::BranchName;
///
///     let name = BranchName::new("feature/health-endpoint").expect("valid");
///     assert_eq!(name.as_str(), "feature/health-endpoint");
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidBranchName`] when the value violates
    /// any of the constraints above.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if Self::is_invalid_branch_name(normalized) {
            return Err(TaskDomainError::InvalidBranchName(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Builds the deterministic timestamp-based name used when no generated
    /// name arrived in time.
    #[must_use]
    pub fn fallback(task_id: TaskId, at: DateTime<Utc>) -> Self {
        let id = task_id.into_inner().simple().to_string();
        let short_id: String = id.chars().take(8).collect();
        Self(format!(
            "{FALLBACK_PREFIX}/{}-{short_id}",
            at.format("%Y%m%d-%H%M%S")
        ))
    }

    fn is_invalid_branch_name(name: &str) -> bool {
        let is_empty = name.is_empty();
        let bad_start = name.starts_with('-') || name.starts_with('/');
        let bad_end = name.ends_with('/') || name.ends_with(".lock") || name.ends_with('.');
        let contains_forbidden =
            name.contains(FORBIDDEN_CHARS) || name.contains("..") || name.contains("@{");
        let exceeds_length_limit = name.len() > MAX_BRANCH_NAME_LENGTH;

        is_empty || bad_start || bad_end || contains_forbidden || exceeds_length_limit
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}
