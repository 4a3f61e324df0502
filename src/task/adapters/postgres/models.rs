//! Diesel row models for task persistence.

use super::schema::{task_logs, task_messages, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Full task row, used for reads, inserts, and patch write-back.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owner identifier.
    pub owner_id: String,
    /// Original instruction.
    pub prompt: String,
    /// Display title.
    pub title: String,
    /// Repository clone URL.
    pub repo_url: String,
    /// Working branch.
    pub branch_name: Option<String>,
    /// Selected agent.
    pub agent: String,
    /// Selected model.
    pub model: Option<String>,
    /// Wall-clock budget in minutes.
    pub max_duration_minutes: i32,
    /// Keep-alive flag.
    pub keep_alive: bool,
    /// Install-dependencies flag.
    pub install_dependencies: bool,
    /// Lifecycle status.
    pub status: String,
    /// Completion percentage.
    pub progress: i16,
    /// Free-text status message.
    pub status_message: Option<String>,
    /// Live sandbox identifier.
    pub sandbox_id: Option<String>,
    /// Live sandbox URL.
    pub sandbox_url: Option<String>,
    /// Dev-server preview URL.
    pub preview_url: Option<String>,
    /// Resumable agent session.
    pub agent_session_id: Option<String>,
    /// Last run error.
    pub error: Option<String>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Transcript row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskMessageRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Author role.
    pub role: String,
    /// Message body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Log row as read back.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskLogRow {
    /// Log level.
    pub level: String,
    /// Log message.
    pub message: String,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for log rows; the sequence is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_logs)]
pub struct NewTaskLogRow {
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Log level.
    pub level: String,
    /// Log message.
    pub message: String,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}
