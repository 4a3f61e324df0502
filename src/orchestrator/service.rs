//! Public entry points for starting, continuing, and stopping tasks.

use super::{
    ContinueTaskRequest, CreateTaskRequest, OrchestratorError, OrchestratorPorts,
    OrchestratorSettings, ValidationError,
    run::{RunMode, RunPlan},
};
use crate::sandbox::services::{SandboxProvisioner, SandboxRegistry};
use crate::task::{
    adapters::sink::StoreProgressSink,
    domain::{
        MaxDuration, MessageOrder, MessageRole, NewTask, RepositoryUrl, Task, TaskDomainError,
        TaskId, TaskMessage, TaskStatus, TaskUpdate, UserId,
    },
    ports::ProgressSink,
    services::ProgressLogger,
};
use mockable::Clock;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

/// Handle to a running job.
///
/// Dropping the handle detaches the job; it keeps running.
#[derive(Debug)]
pub struct TaskJob {
    task_id: TaskId,
    handle: JoinHandle<TaskStatus>,
}

impl TaskJob {
    /// Returns the task driven by this job.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Waits for the job and returns the status it settled on.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError`] when the job itself was aborted.
    pub async fn wait(self) -> Result<TaskStatus, JoinError> {
        self.handle.await
    }
}

/// State shared by every job of one orchestrator.
pub(super) struct Engine<C: Clock + Send + Sync> {
    pub(super) ports: OrchestratorPorts,
    pub(super) settings: OrchestratorSettings,
    pub(super) provisioner: SandboxProvisioner,
    pub(super) sink: Arc<dyn ProgressSink>,
    pub(super) clock: Arc<C>,
}

impl<C: Clock + Send + Sync + 'static> Engine<C> {
    pub(super) fn logger(&self, task_id: TaskId) -> ProgressLogger {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::<C>::clone(&self.clock);
        ProgressLogger::new(task_id, Arc::clone(&self.sink), clock)
    }
}

/// Drives tasks from creation to a terminal status.
///
/// `create_task` and `continue_task` validate synchronously, then start an
/// independent job and return immediately. Each job provisions or
/// reconnects a sandbox, runs the agent, publishes the branch, records the
/// outcome, and disposes of the sandbox unless it is kept alive.
pub struct TaskLifecycleOrchestrator<C: Clock + Send + Sync> {
    engine: Arc<Engine<C>>,
}

impl<C: Clock + Send + Sync> Clone for TaskLifecycleOrchestrator<C> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<C: Clock + Send + Sync + 'static> TaskLifecycleOrchestrator<C> {
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(ports: OrchestratorPorts, settings: OrchestratorSettings, clock: Arc<C>) -> Self {
        let sink = ports.progress.clone().unwrap_or_else(|| {
            Arc::new(StoreProgressSink::new(
                Arc::clone(&ports.store),
                Arc::clone(&clock),
            )) as Arc<dyn ProgressSink>
        });
        let provisioner = SandboxProvisioner::new(
            Arc::clone(&ports.sandboxes),
            Arc::clone(&ports.inspector),
            ports.registry.clone(),
            settings.provisioner.clone(),
        );
        Self {
            engine: Arc::new(Engine {
                ports,
                settings,
                provisioner,
                sink,
                clock,
            }),
        }
    }

    /// Returns the live-sandbox registry.
    #[must_use]
    pub fn registry(&self) -> &SandboxRegistry {
        &self.engine.ports.registry
    }

    /// Validates `request`, records the task, and starts its first run.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Validation`] for malformed requests,
    /// [`OrchestratorError::RateLimitExceeded`] when the owner is over
    /// quota, and [`OrchestratorError::Store`] when the task cannot be
    /// recorded. No job is started on error.
    #[tracing::instrument(skip_all, fields(owner_id = %request.owner_id))]
    pub async fn create_task(&self, request: CreateTaskRequest) -> Result<TaskJob, OrchestratorError> {
        let CreateTaskRequest {
            owner_id,
            repo_url,
            prompt,
            agent,
            model,
            max_duration_minutes,
            keep_alive,
            install_dependencies,
            connectors,
        } = request;

        let owner = UserId::new(owner_id)?;
        let max_duration = max_duration_minutes
            .map(MaxDuration::from_minutes)
            .transpose()?
            .unwrap_or(self.engine.settings.default_max_duration);
        let new_task = NewTask {
            owner_id: owner,
            prompt,
            repo_url: RepositoryUrl::new(repo_url)?,
            agent,
            model,
            max_duration,
            keep_alive,
            install_dependencies,
        };
        let task = Task::new(new_task, self.engine.clock.as_ref())?;
        self.check_rate_limit(task.owner_id()).await?;

        let store = &self.engine.ports.store;
        store.create(&task).await?;
        let opening = TaskMessage::new(
            task.id(),
            MessageRole::User,
            task.prompt(),
            self.engine.clock.as_ref(),
        )?;
        store.insert_message(&opening).await?;
        let started = store
            .update(
                task.id(),
                TaskUpdate::at(self.engine.clock.utc())
                    .status(TaskStatus::Processing)
                    .message("Task started"),
            )
            .await?;
        tracing::info!(task_id = %started.id(), agent = %started.agent(), "task created");

        self.spawn_branch_name_generation(&started);
        Ok(self.spawn(RunPlan {
            task: started,
            mode: RunMode::Initial,
            connectors,
        }))
    }

    /// Re-opens a finished task with a follow-up message and starts a run.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::NotFound`] for unknown tasks,
    /// [`OrchestratorError::Validation`] when the message is blank, the task
    /// has no branch, or its status does not allow continuation, and
    /// [`OrchestratorError::RateLimitExceeded`] when over quota.
    #[tracing::instrument(skip_all, fields(task_id = %request.task_id))]
    pub async fn continue_task(
        &self,
        request: ContinueTaskRequest,
    ) -> Result<TaskJob, OrchestratorError> {
        let ContinueTaskRequest {
            task_id,
            message,
            connectors,
        } = request;
        if message.trim().is_empty() {
            return Err(TaskDomainError::EmptyMessage.into());
        }

        let store = &self.engine.ports.store;
        let task = store
            .get(task_id)
            .await?
            .filter(|task| !task.is_deleted())
            .ok_or(OrchestratorError::NotFound(task_id))?;
        if !task.status().can_continue() {
            return Err(ValidationError::NotContinuable {
                task_id,
                status: task.status(),
            }
            .into());
        }
        if task.branch_name().is_none() {
            return Err(ValidationError::MissingBranchName(task_id).into());
        }
        self.check_rate_limit(task.owner_id()).await?;

        let mut history = store
            .list_messages(
                task_id,
                MessageOrder::Descending,
                Some(self.engine.settings.history_limit),
            )
            .await?;
        history.reverse();

        let entry = TaskMessage::new(
            task_id,
            MessageRole::User,
            message.as_str(),
            self.engine.clock.as_ref(),
        )?;
        store.insert_message(&entry).await?;
        let reopened = store
            .update(task_id, TaskUpdate::reopen(self.engine.clock.utc()))
            .await?;
        tracing::info!("task continued");

        Ok(self.spawn(RunPlan {
            task: reopened,
            mode: RunMode::FollowUp { message, history },
            connectors,
        }))
    }

    /// Marks a task as stopped.
    ///
    /// The running job observes the stop at its next checkpoint. Once the
    /// agent has started, the run finishes with its real outcome.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::NotFound`] for unknown tasks and
    /// [`OrchestratorError::Validation`] when the task is already finished.
    #[tracing::instrument(skip(self))]
    pub async fn stop_task(&self, task_id: TaskId) -> Result<Task, OrchestratorError> {
        let store = &self.engine.ports.store;
        let task = store
            .get(task_id)
            .await?
            .ok_or(OrchestratorError::NotFound(task_id))?;
        if !task.status().can_transition_to(TaskStatus::Stopped) {
            return Err(ValidationError::NotStoppable {
                task_id,
                status: task.status(),
            }
            .into());
        }
        let stopped = store
            .update(task_id, TaskUpdate::stopped(self.engine.clock.utc()))
            .await?;
        tracing::info!("task stop requested");
        Ok(stopped)
    }

    async fn check_rate_limit(&self, owner: &UserId) -> Result<(), OrchestratorError> {
        let decision = self.engine.ports.rate_limiter.check(owner).await?;
        if decision.allowed {
            return Ok(());
        }
        tracing::info!(owner_id = %owner, "rate limit exceeded");
        Err(OrchestratorError::RateLimitExceeded {
            remaining: decision.remaining,
            total: decision.total,
            reset_at: decision.reset_at,
        })
    }

    fn spawn_branch_name_generation(&self, task: &Task) {
        let Some(generator) = self.engine.ports.branch_names.clone() else {
            return;
        };
        let store = Arc::clone(&self.engine.ports.store);
        let clock = Arc::clone(&self.engine.clock);
        let snapshot = task.clone();
        tokio::spawn(
            async move {
                let Some(candidate) = generator.suggest(&snapshot).await else {
                    return;
                };
                match store
                    .claim_branch_name(snapshot.id(), candidate, clock.utc())
                    .await
                {
                    Ok(name) => tracing::debug!(branch = %name, "branch name resolved"),
                    Err(err) => tracing::warn!(error = %err, "failed to store generated branch name"),
                }
            }
            .in_current_span(),
        );
    }

    fn spawn(&self, plan: RunPlan) -> TaskJob {
        let task_id = plan.task.id();
        let engine = Arc::clone(&self.engine);
        let span = tracing::info_span!("task_run", task_id = %task_id);
        let handle = tokio::spawn(engine.supervise(plan).instrument(span));
        TaskJob { task_id, handle }
    }
}
