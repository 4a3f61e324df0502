//! Task aggregate root.

use super::{
    BranchName, MaxDuration, Progress, RepositoryUrl, SandboxBinding, TaskDomainError, TaskId,
    TaskStatus, TaskUpdate, UserId,
};
use crate::agent::domain::{AgentKind, AgentSessionId, ModelId};
use crate::sandbox::domain::SandboxId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Longest derived title, in characters.
const MAX_TITLE_CHARS: usize = 80;

/// User-supplied settings captured when a task is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owner of the task.
    pub owner_id: UserId,
    /// Original instruction.
    pub prompt: String,
    /// Repository to change.
    pub repo_url: RepositoryUrl,
    /// Agent to run.
    pub agent: AgentKind,
    /// Model override.
    pub model: Option<ModelId>,
    /// Wall-clock budget per run.
    pub max_duration: MaxDuration,
    /// Retain the sandbox after a run for later continuations.
    pub keep_alive: bool,
    /// Install project dependencies during provisioning.
    pub install_dependencies: bool,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner_id: UserId,
    prompt: String,
    title: String,
    repo_url: RepositoryUrl,
    branch_name: Option<BranchName>,
    agent: AgentKind,
    model: Option<ModelId>,
    max_duration: MaxDuration,
    keep_alive: bool,
    install_dependencies: bool,
    status: TaskStatus,
    progress: Progress,
    status_message: Option<String>,
    sandbox_id: Option<SandboxId>,
    sandbox_url: Option<String>,
    preview_url: Option<String>,
    agent_session_id: Option<AgentSessionId>,
    error: Option<String>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owner of the task.
    pub owner_id: UserId,
    /// Original instruction.
    pub prompt: String,
    /// Display title.
    pub title: String,
    /// Repository URL.
    pub repo_url: RepositoryUrl,
    /// Branch name, once resolved.
    pub branch_name: Option<BranchName>,
    /// Selected agent.
    pub agent: AgentKind,
    /// Selected model.
    pub model: Option<ModelId>,
    /// Wall-clock budget per run.
    pub max_duration: MaxDuration,
    /// Keep-alive flag.
    pub keep_alive: bool,
    /// Install-dependencies flag.
    pub install_dependencies: bool,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Completion percentage.
    pub progress: Progress,
    /// Free-text status message.
    pub status_message: Option<String>,
    /// Live sandbox identifier.
    pub sandbox_id: Option<SandboxId>,
    /// Live sandbox URL.
    pub sandbox_url: Option<String>,
    /// Dev-server preview URL.
    pub preview_url: Option<String>,
    /// Resumable agent session.
    pub agent_session_id: Option<AgentSessionId>,
    /// Last run error.
    pub error: Option<String>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest change timestamp.
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp of the latest run.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a pending task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyPrompt`] when the prompt is blank.
    pub fn new(params: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        if params.prompt.trim().is_empty() {
            return Err(TaskDomainError::EmptyPrompt);
        }
        let timestamp = clock.utc();
        let title = derive_title(&params.prompt);

        Ok(Self {
            id: TaskId::new(),
            owner_id: params.owner_id,
            prompt: params.prompt,
            title,
            repo_url: params.repo_url,
            branch_name: None,
            agent: params.agent,
            model: params.model,
            max_duration: params.max_duration,
            keep_alive: params.keep_alive,
            install_dependencies: params.install_dependencies,
            status: TaskStatus::Pending,
            progress: Progress::ZERO,
            status_message: Some("Task created, preparing to start...".to_owned()),
            sandbox_id: None,
            sandbox_url: None,
            preview_url: None,
            agent_session_id: None,
            error: None,
            deleted_at: None,
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: None,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner_id: data.owner_id,
            prompt: data.prompt,
            title: data.title,
            repo_url: data.repo_url,
            branch_name: data.branch_name,
            agent: data.agent,
            model: data.model,
            max_duration: data.max_duration,
            keep_alive: data.keep_alive,
            install_dependencies: data.install_dependencies,
            status: data.status,
            progress: data.progress,
            status_message: data.status_message,
            sandbox_id: data.sandbox_id,
            sandbox_url: data.sandbox_url,
            preview_url: data.preview_url,
            agent_session_id: data.agent_session_id,
            error: data.error,
            deleted_at: data.deleted_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owner.
    #[must_use]
    pub const fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Returns the original instruction.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the repository URL.
    #[must_use]
    pub const fn repo_url(&self) -> &RepositoryUrl {
        &self.repo_url
    }

    /// Returns the branch name, once resolved.
    #[must_use]
    pub const fn branch_name(&self) -> Option<&BranchName> {
        self.branch_name.as_ref()
    }

    /// Returns the selected agent.
    #[must_use]
    pub const fn agent(&self) -> AgentKind {
        self.agent
    }

    /// Returns the selected model.
    #[must_use]
    pub const fn model(&self) -> Option<&ModelId> {
        self.model.as_ref()
    }

    /// Returns the wall-clock budget per run.
    #[must_use]
    pub const fn max_duration(&self) -> MaxDuration {
        self.max_duration
    }

    /// Returns `true` when the sandbox is retained between runs.
    #[must_use]
    pub const fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Returns `true` when provisioning installs dependencies.
    #[must_use]
    pub const fn install_dependencies(&self) -> bool {
        self.install_dependencies
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the completion percentage.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// Returns the status message.
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Returns the live sandbox identifier.
    #[must_use]
    pub const fn sandbox_id(&self) -> Option<&SandboxId> {
        self.sandbox_id.as_ref()
    }

    /// Returns the live sandbox URL.
    #[must_use]
    pub fn sandbox_url(&self) -> Option<&str> {
        self.sandbox_url.as_deref()
    }

    /// Returns the dev-server preview URL.
    #[must_use]
    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    /// Returns the resumable agent session.
    #[must_use]
    pub const fn agent_session_id(&self) -> Option<&AgentSessionId> {
        self.agent_session_id.as_ref()
    }

    /// Returns the last run error.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` when the task has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the soft-delete timestamp.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp of the latest run.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Validates and applies a partial update.
    ///
    /// The patch is all-or-nothing: on error the task is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the patch asks
    /// for a status the current one cannot move to.
    pub fn apply(&mut self, update: TaskUpdate) -> Result<(), TaskDomainError> {
        // A stopped task keeps its stop message until a new status is written.
        let holds_message = update.status.is_none() && self.status == TaskStatus::Stopped;
        if let Some(target) = update.status {
            if !self.status.can_transition_to(target) {
                return Err(TaskDomainError::InvalidStateTransition {
                    task_id: self.id,
                    from: self.status,
                    to: target,
                });
            }
            self.status = target;
        }

        if let Some(progress) = update.progress {
            if update.reset_progress || progress >= self.progress {
                self.progress = progress;
            }
        }
        if let Some(message) = update.status_message.filter(|_| !holds_message) {
            self.status_message = message;
        }
        if let Some(error) = update.error {
            self.error = error;
        }
        if let Some(binding) = update.sandbox {
            self.bind_sandbox(binding);
        }
        if let Some(session) = update.agent_session_id {
            self.agent_session_id = session;
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = completed_at;
        }

        self.updated_at = update.at;
        Ok(())
    }

    /// Sets the branch name unless one is already recorded and returns the
    /// authoritative name.
    ///
    /// The first name persisted wins; later candidates are discarded.
    pub fn claim_branch_name(&mut self, candidate: BranchName, at: DateTime<Utc>) -> BranchName {
        if let Some(existing) = &self.branch_name {
            return existing.clone();
        }
        self.branch_name = Some(candidate.clone());
        self.updated_at = at;
        candidate
    }

    /// Marks the task as soft-deleted.
    pub fn mark_deleted(&mut self, clock: &impl Clock) {
        let timestamp = clock.utc();
        self.deleted_at = Some(timestamp);
        self.updated_at = timestamp;
    }

    fn bind_sandbox(&mut self, binding: Option<SandboxBinding>) {
        match binding {
            Some(bound) => {
                self.sandbox_id = Some(bound.sandbox_id);
                self.sandbox_url = bound.sandbox_url;
                self.preview_url = bound.preview_url;
            }
            None => {
                self.sandbox_id = None;
                self.sandbox_url = None;
                self.preview_url = None;
            }
        }
    }
}

/// Derives a display title from the first non-blank prompt line.
#[must_use]
pub fn derive_title(prompt: &str) -> String {
    let first_line = prompt
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    if first_line.chars().count() <= MAX_TITLE_CHARS {
        return first_line.to_owned();
    }
    let truncated: String = first_line.chars().take(MAX_TITLE_CHARS - 3).collect();
    format!("{}...", truncated.trim_end())
}
