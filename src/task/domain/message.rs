//! Conversation transcript entries attached to a task.

use super::{ParseTaskValueError, TaskDomainError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message written by the task owner.
    User,
    /// Response produced by the coding agent.
    Agent,
}

impl MessageRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MessageRole {
    type Error = ParseTaskValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "agent" => Ok(Self::Agent),
            _ => Err(ParseTaskValueError {
                kind: "message role",
                value: value.to_owned(),
            }),
        }
    }
}

/// Ordering requested when listing transcript entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    Descending,
}

/// One append-only transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMessage {
    id: Uuid,
    task_id: TaskId,
    role: MessageRole,
    content: String,
    created_at: DateTime<Utc>,
}

impl TaskMessage {
    /// Creates a transcript entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyMessage`] when the content is blank.
    pub fn new(
        task_id: TaskId,
        role: MessageRole,
        content: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let raw = content.into();
        if raw.trim().is_empty() {
            return Err(TaskDomainError::EmptyMessage);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            task_id,
            role,
            content: raw,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: Uuid,
        task_id: TaskId,
        role: MessageRole,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            role,
            content,
            created_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the author role.
    #[must_use]
    pub const fn role(&self) -> MessageRole {
        self.role
    }

    /// Returns the message body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
