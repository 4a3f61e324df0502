//! One supervised run: branch, sandbox, agent, publish.

use super::{
    RunContext, RunFailure,
    service::Engine,
    watchdog::{Watched, watch},
};
use crate::agent::{
    domain::{AgentRequest, McpConnector, SanitizedPrompt},
    services::render_follow_up,
};
use crate::sandbox::{
    domain::SandboxCommand,
    ports::SandboxHandle,
    services::{ProvisionOutcome, ProvisionRequest},
};
use crate::task::{
    domain::{
        BranchName, MessageRole, Progress, SandboxBinding, Task, TaskMessage, TaskStatus,
        TaskUpdate,
    },
    services::ProgressLogger,
};
use crate::vcs::domain::CommitContext;
use mockable::Clock;
use std::sync::Arc;
use tracing::Instrument;

/// Why a run was started.
pub(super) enum RunMode {
    /// First run of a new task.
    Initial,
    /// Follow-up message with prior transcript, oldest first.
    FollowUp {
        message: String,
        history: Vec<TaskMessage>,
    },
}

/// Everything a run needs, captured when the job starts.
pub(super) struct RunPlan {
    pub(super) task: Task,
    pub(super) mode: RunMode,
    pub(super) connectors: Vec<McpConnector>,
}

impl RunPlan {
    fn instruction(&self) -> &str {
        match &self.mode {
            RunMode::Initial => self.task.prompt(),
            RunMode::FollowUp { message, .. } => message,
        }
    }
}

/// Non-failing end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Finish {
    Completed,
    Stopped,
}

struct Workspace {
    handle: Arc<dyn SandboxHandle>,
    resumed: bool,
}

impl<C: Clock + Send + Sync + 'static> Engine<C> {
    /// Runs `plan` under the watchdog and settles the outcome.
    pub(super) async fn supervise(self: Arc<Self>, plan: RunPlan) -> TaskStatus {
        let task_id = plan.task.id();
        let budget = plan.task.max_duration();
        let logger = self.logger(task_id);
        let context = RunContext::new(task_id, Arc::clone(&self.ports.store));

        let runner = Arc::clone(&self);
        let run_logger = logger.clone();
        let mut run = tokio::spawn(
            async move { runner.drive(plan, &context, &run_logger).await }.in_current_span(),
        );

        let lead = self.settings.timeout_warning_lead;
        let warning_logger = logger.clone();
        let warning = async move {
            warning_logger
                .info(format!(
                    "Task will time out in {} seconds",
                    lead.as_secs()
                ))
                .await;
        };

        let watched = watch(&mut run, budget.as_duration(), lead, warning).await;
        let result = match watched {
            Watched::Finished(Ok(result)) => result,
            Watched::Finished(Err(join_error)) => {
                tracing::error!(error = %join_error, "run panicked");
                Err(RunFailure::Panicked(join_error.to_string()))
            }
            Watched::TimedOut => {
                run.abort();
                if run.await.is_err_and(|err| err.is_panic()) {
                    tracing::warn!("run panicked while being aborted");
                }
                tracing::warn!(minutes = budget.minutes(), "run timed out");
                Err(RunFailure::Timeout {
                    minutes: budget.minutes(),
                })
            }
        };
        self.settle(task_id, result, &logger).await
    }

    async fn drive(
        &self,
        plan: RunPlan,
        context: &RunContext,
        logger: &ProgressLogger,
    ) -> Result<Finish, RunFailure> {
        logger.progress(10, "Preparing task run").await;
        if context.checkpoint().await {
            return Ok(Finish::Stopped);
        }

        let branch = self.resolve_branch(&plan.task).await?;
        logger
            .progress(15, format!("Using branch {branch}"))
            .await;
        if context.checkpoint().await {
            return Ok(Finish::Stopped);
        }

        let Some(workspace) = self
            .acquire_sandbox(&plan, &branch, context, logger)
            .await?
        else {
            return Ok(Finish::Stopped);
        };
        if context.checkpoint().await {
            return Ok(Finish::Stopped);
        }

        self.run_agent(&plan, &workspace, logger).await?;
        self.publish(&plan, &branch, workspace.handle.as_ref(), logger)
            .await?;
        Ok(Finish::Completed)
    }

    /// Waits for a generated branch name, then claims a fallback.
    async fn resolve_branch(&self, task: &Task) -> Result<BranchName, RunFailure> {
        if let Some(name) = task.branch_name() {
            return Ok(name.clone());
        }
        if let Some(name) = self.await_generated_branch(task).await? {
            return Ok(name);
        }

        let now = self.clock.utc();
        let fallback = BranchName::fallback(task.id(), now);
        Ok(self
            .ports
            .store
            .claim_branch_name(task.id(), fallback, now)
            .await?)
    }

    /// Polls the store for a name written by the branch name generator.
    ///
    /// Returns at once when no generator is configured.
    async fn await_generated_branch(&self, task: &Task) -> Result<Option<BranchName>, RunFailure> {
        if self.ports.branch_names.is_none() {
            return Ok(None);
        }

        let waited_since = tokio::time::Instant::now();
        loop {
            let current = self.ports.store.get(task.id()).await?;
            if let Some(name) = current.as_ref().and_then(Task::branch_name) {
                return Ok(Some(name.clone()));
            }
            let stopped = current
                .as_ref()
                .is_some_and(|latest| latest.status() == TaskStatus::Stopped);
            if stopped || waited_since.elapsed() >= self.settings.branch_name_wait {
                return Ok(None);
            }
            tokio::time::sleep(self.settings.branch_name_poll).await;
        }
    }

    async fn acquire_sandbox(
        &self,
        plan: &RunPlan,
        branch: &BranchName,
        context: &RunContext,
        logger: &ProgressLogger,
    ) -> Result<Option<Workspace>, RunFailure> {
        let follow_up = matches!(plan.mode, RunMode::FollowUp { .. });
        if follow_up {
            if let Some(handle) = self.reconnect(&plan.task, logger).await {
                logger.progress(50, "Reconnected to existing sandbox").await;
                return Ok(Some(Workspace {
                    handle,
                    resumed: true,
                }));
            }
            self.retire_previous(&plan.task, logger).await;
        }

        let request = ProvisionRequest {
            task_id: plan.task.id(),
            repo_url: plan.task.repo_url(),
            branch,
            existing_branch: follow_up,
            install_dependencies: plan.task.install_dependencies(),
        };
        let provisioned = match self.provisioner.provision(request, logger, context).await? {
            ProvisionOutcome::Ready(provisioned) => provisioned,
            ProvisionOutcome::Cancelled => return Ok(None),
        };

        let binding = SandboxBinding {
            sandbox_id: provisioned.handle.id().clone(),
            sandbox_url: Some(provisioned.domain),
            preview_url: provisioned.preview_url,
        };
        self.ports
            .store
            .update(
                plan.task.id(),
                TaskUpdate::at(self.clock.utc())
                    .sandbox(binding)
                    .progress(Progress::saturating(50))
                    .message("Sandbox ready"),
            )
            .await?;
        Ok(Some(Workspace {
            handle: provisioned.handle,
            resumed: false,
        }))
    }

    /// Returns the task's kept-alive sandbox when it still answers.
    async fn reconnect(
        &self,
        task: &Task,
        logger: &ProgressLogger,
    ) -> Option<Arc<dyn SandboxHandle>> {
        if !task.keep_alive() {
            return None;
        }
        let sandbox_id = task.sandbox_id()?;
        let registry = &self.ports.registry;

        let cached = registry
            .lookup(task.id())
            .filter(|handle| handle.id() == sandbox_id);
        let candidate = if let Some(handle) = cached {
            handle
        } else {
            match self.ports.sandboxes.get(sandbox_id).await {
                Ok(handle) => handle,
                Err(err) => {
                    logger
                        .info(format!("Sandbox {sandbox_id} is no longer available ({err})"))
                        .await;
                    return None;
                }
            }
        };

        match candidate.run_command(&SandboxCommand::new("pwd")).await {
            Ok(output) if output.succeeded() => {
                let stale = registry
                    .register(task.id(), Arc::clone(&candidate))
                    .filter(|previous| previous.id() != candidate.id());
                if let Some(previous) = stale {
                    tracing::warn!(sandbox_id = %previous.id(), "dropped a stale registry entry");
                }
                logger
                    .success(format!("Reconnected to sandbox {sandbox_id}"))
                    .await;
                Some(candidate)
            }
            Ok(_) | Err(_) => {
                logger
                    .info(format!("Sandbox {sandbox_id} did not respond, provisioning a new one"))
                    .await;
                None
            }
        }
    }

    /// Shuts down any sandbox still recorded for the task before a new one
    /// is created.
    async fn retire_previous(&self, task: &Task, logger: &ProgressLogger) {
        if let Some(previous) = self.ports.registry.unregister(task.id()) {
            if let Err(err) = previous.shutdown().await {
                tracing::warn!(sandbox_id = %previous.id(), error = %err, "failed to retire sandbox");
            }
        }
        if task.sandbox_id().is_none() {
            return;
        }
        let cleared = TaskUpdate::at(self.clock.utc()).clear_sandbox();
        if let Err(err) = self.ports.store.update(task.id(), cleared).await {
            tracing::warn!(error = %err, "failed to clear retired sandbox");
        }
        logger.info("Previous sandbox retired").await;
    }

    async fn run_agent(
        &self,
        plan: &RunPlan,
        workspace: &Workspace,
        logger: &ProgressLogger,
    ) -> Result<(), RunFailure> {
        let text = self.agent_prompt(plan, workspace.resumed);
        let mut request = AgentRequest::new(SanitizedPrompt::new(&text), plan.task.agent())
            .with_model(plan.task.model().cloned())
            .with_connectors(plan.connectors.clone());
        if workspace.resumed {
            request = request.resuming(plan.task.agent_session_id().cloned());
        }

        logger
            .progress(55, format!("Running {} agent", plan.task.agent()))
            .await;
        let output = self
            .ports
            .agent
            .execute(workspace.handle.as_ref(), &request, logger)
            .await?;

        let task_id = plan.task.id();
        if let Some(session) = output.session_id {
            let update = TaskUpdate::at(self.clock.utc()).agent_session(session);
            if let Err(err) = self.ports.store.update(task_id, update).await {
                tracing::warn!(error = %err, "failed to store agent session");
            }
        }
        if let Some(response) = output.response.filter(|text| !text.trim().is_empty()) {
            match TaskMessage::new(task_id, MessageRole::Agent, response, self.clock.as_ref()) {
                Ok(entry) => {
                    if let Err(err) = self.ports.store.insert_message(&entry).await {
                        tracing::warn!(error = %err, "failed to store agent response");
                    }
                }
                Err(err) => tracing::warn!(error = %err, "discarding agent response"),
            }
        }
        logger.progress(80, "Agent finished").await;
        Ok(())
    }

    fn agent_prompt(&self, plan: &RunPlan, resumed: bool) -> String {
        match &plan.mode {
            RunMode::Initial => plan.task.prompt().to_owned(),
            RunMode::FollowUp { message, .. } if resumed => message.clone(),
            RunMode::FollowUp { message, history } => {
                let recent = history
                    .len()
                    .saturating_sub(self.settings.history_limit);
                let context = history.get(recent..).unwrap_or_default();
                render_follow_up(message, context).unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "sending follow-up without history");
                    message.clone()
                })
            }
        }
    }

    async fn publish(
        &self,
        plan: &RunPlan,
        branch: &BranchName,
        handle: &dyn SandboxHandle,
        logger: &ProgressLogger,
    ) -> Result<(), RunFailure> {
        logger.progress(85, "Publishing changes").await;
        let context = CommitContext {
            prompt: plan.instruction().to_owned(),
            repository: plan.task.repo_url().repository_name().to_owned(),
            agent: plan.task.agent(),
        };
        let message = self.ports.commit_messages.resolve(&context).await;
        let outcome = self
            .ports
            .publisher
            .push(handle, branch, &message, logger)
            .await?;
        if outcome.push_failed {
            return Err(RunFailure::PushRejected(branch.clone()));
        }
        logger.progress(95, "Changes published").await;
        Ok(())
    }
}
