//! Commit message context and the deterministic fallback.

use crate::agent::domain::AgentKind;

/// Subject lines longer than this are truncated.
const MAX_SUBJECT_CHARS: usize = 72;

/// Message used when the prompt yields nothing usable.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Apply automated changes";

/// Inputs available to commit message generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitContext {
    /// The task prompt.
    pub prompt: String,
    /// Bare repository name.
    pub repository: String,
    /// Agent that produced the changes.
    pub agent: AgentKind,
}

/// Derives a commit subject from the prompt.
///
/// Uses the first non-blank line with whitespace collapsed, truncated to 72
/// characters. Never returns an empty string.
///
/// ```
/// use atelier::vcs::domain::fallback_commit_message;
///
/// assert_eq!(fallback_commit_message("  add   a health\tendpoint\nmore"), "add a health endpoint");
/// assert_eq!(fallback_commit_message("   "), "Apply automated changes");
/// ```
#[must_use]
pub fn fallback_commit_message(prompt: &str) -> String {
    let subject = prompt
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|line| !line.is_empty());

    match subject {
        None => DEFAULT_COMMIT_MESSAGE.to_owned(),
        Some(line) if line.chars().count() <= MAX_SUBJECT_CHARS => line,
        Some(line) => {
            let truncated: String = line.chars().take(MAX_SUBJECT_CHARS - 3).collect();
            format!("{}...", truncated.trim_end())
        }
    }
}
