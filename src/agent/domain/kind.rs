//! Selectable coding agents and their identifiers.

use super::AgentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coding agent that applies the requested change inside a sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Anthropic Claude Code CLI.
    Claude,
    /// `OpenAI` Codex CLI.
    Codex,
    /// GitHub Copilot CLI.
    Copilot,
    /// Cursor agent CLI.
    Cursor,
    /// Google Gemini CLI.
    Gemini,
    /// opencode CLI.
    Opencode,
}

impl AgentKind {
    /// Every supported agent, in presentation order.
    pub const ALL: [Self; 6] = [
        Self::Claude,
        Self::Codex,
        Self::Copilot,
        Self::Cursor,
        Self::Gemini,
        Self::Opencode,
    ];

    /// Returns the canonical identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Copilot => "copilot",
            Self::Cursor => "cursor",
            Self::Gemini => "gemini",
            Self::Opencode => "opencode",
        }
    }

    /// Returns the executable invoked inside the sandbox.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Copilot => "copilot",
            Self::Cursor => "cursor-agent",
            Self::Gemini => "gemini",
            Self::Opencode => "opencode",
        }
    }

    /// Returns the model used when the task does not select one.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Claude => "sonnet",
            Self::Codex | Self::Copilot | Self::Opencode => "gpt-5",
            Self::Cursor => "auto",
            Self::Gemini => "gemini-2.5-pro",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AgentKind {
    type Error = AgentDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| AgentDomainError::UnknownAgent(value.to_owned()))
    }
}

/// Model identifier passed through to the agent CLI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Creates a validated model identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptyModelId`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, AgentDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(AgentDomainError::EmptyModelId);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the model identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resumable session identifier reported by an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentSessionId(String);

impl AgentSessionId {
    /// Creates a validated session identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptySessionId`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, AgentDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(AgentDomainError::EmptySessionId);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the session identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
