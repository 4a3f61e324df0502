//! Fresh sandbox provisioning.

use super::{
    SandboxRegistry,
    dependencies::{self, DependencyInstall},
    port_detector::{DEFAULT_DEV_PORT, detect_port},
};
use crate::sandbox::{
    domain::{
        PackageManager, ResourceSpec, SandboxCommand, SandboxCreateRequest, SandboxRuntime,
        SandboxSource,
    },
    ports::{CancellationCheck, SandboxError, SandboxHandle, SandboxService},
};
use crate::task::{
    domain::{BranchName, RepositoryUrl, TaskId},
    services::ProgressLogger,
};
use crate::vcs::{domain::RepoManifest, ports::RepositoryInspector};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Static provisioning settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerSettings {
    /// Git author name configured in every sandbox.
    pub git_author_name: String,
    /// Git author email configured in every sandbox.
    pub git_author_email: String,
    /// Manager used when no lockfile is found and for the install retry.
    pub default_package_manager: PackageManager,
    /// Virtual CPUs requested per sandbox.
    pub vcpus: u8,
    /// Provider-side sandbox lifetime.
    pub sandbox_timeout: Duration,
    /// Shallow clone depth; full clone when `None`.
    pub clone_depth: Option<u32>,
}

impl Default for ProvisionerSettings {
    fn default() -> Self {
        Self {
            git_author_name: "Atelier Agent".to_owned(),
            git_author_email: "agent@atelier.invalid".to_owned(),
            default_package_manager: PackageManager::Npm,
            vcpus: 4,
            sandbox_timeout: Duration::from_secs(5 * 60 * 60),
            clone_depth: Some(1),
        }
    }
}

/// What to provision.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionRequest<'a> {
    /// Task the sandbox belongs to.
    pub task_id: TaskId,
    /// Repository to clone.
    pub repo_url: &'a RepositoryUrl,
    /// Working branch.
    pub branch: &'a BranchName,
    /// `true` when the branch already exists on the remote.
    pub existing_branch: bool,
    /// Install project dependencies.
    pub install_dependencies: bool,
}

/// A sandbox ready for the agent.
#[derive(Clone)]
pub struct ProvisionedSandbox {
    /// Handle to the sandbox.
    pub handle: Arc<dyn SandboxHandle>,
    /// Public URL of the sandbox.
    pub domain: String,
    /// Dev-server URL when one was started.
    pub preview_url: Option<String>,
    /// Branch checked out in the working tree.
    pub branch: BranchName,
    /// Result of the dependency step.
    pub dependencies: DependencyInstall,
}

/// Result of a provisioning attempt that did not fail.
pub enum ProvisionOutcome {
    /// The sandbox is ready.
    Ready(ProvisionedSandbox),
    /// Cancellation was observed between steps.
    Cancelled,
}

/// Fatal provisioning failures.
#[derive(Debug, Clone, Error)]
pub enum ProvisionError {
    /// The sandbox could not be created.
    #[error("failed to create sandbox: {0}")]
    Creation(#[source] SandboxError),

    /// Git identity could not be configured.
    #[error("failed to configure git: {0}")]
    GitSetup(String),

    /// The working branch could not be checked out.
    #[error("failed to check out branch {branch}: {reason}")]
    Branch {
        /// Requested branch.
        branch: BranchName,
        /// Git diagnostic.
        reason: String,
    },

    /// The sandbox stopped responding during setup.
    #[error("sandbox failed during setup: {0}")]
    Sandbox(#[from] SandboxError),
}

/// Creates and prepares sandboxes for task runs.
///
/// A created sandbox is registered under its task immediately, so it can be
/// disposed even when provisioning is interrupted.
#[derive(Clone)]
pub struct SandboxProvisioner {
    service: Arc<dyn SandboxService>,
    inspector: Arc<dyn RepositoryInspector>,
    registry: SandboxRegistry,
    settings: ProvisionerSettings,
}

impl SandboxProvisioner {
    /// Creates a provisioner.
    #[must_use]
    pub fn new(
        service: Arc<dyn SandboxService>,
        inspector: Arc<dyn RepositoryInspector>,
        registry: SandboxRegistry,
        settings: ProvisionerSettings,
    ) -> Self {
        Self {
            service,
            inspector,
            registry,
            settings,
        }
    }

    /// Provisions a fresh sandbox.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] when a step fails fatally. Dependency
    /// installation failures are logged and do not fail provisioning.
    #[tracing::instrument(skip_all, fields(task_id = %request.task_id, branch = %request.branch))]
    pub async fn provision(
        &self,
        request: ProvisionRequest<'_>,
        logger: &ProgressLogger,
        cancel: &dyn CancellationCheck,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        if cancel.is_cancelled().await {
            return Ok(ProvisionOutcome::Cancelled);
        }

        let planned = self.plan_manifest(request.repo_url, logger).await;
        let port = detect_port(&planned);
        logger.progress(20, "Creating sandbox environment").await;
        let handle = self.create(&request, &planned, port, logger).await?;

        if cancel.is_cancelled().await {
            return Ok(ProvisionOutcome::Cancelled);
        }
        self.configure_git(handle.as_ref()).await?;
        checkout_branch(handle.as_ref(), &request, logger).await?;
        logger.progress(30, "Sandbox ready, preparing project").await;

        if cancel.is_cancelled().await {
            return Ok(ProvisionOutcome::Cancelled);
        }
        let manifest = dependencies::read_manifest(handle.as_ref()).await;
        let installed = if request.install_dependencies {
            logger.progress(35, "Installing dependencies").await;
            dependencies::install_dependencies(
                handle.as_ref(),
                &manifest,
                self.settings.default_package_manager,
                logger,
            )
            .await
        } else {
            DependencyInstall::NoManifest
        };

        if cancel.is_cancelled().await {
            return Ok(ProvisionOutcome::Cancelled);
        }
        let domain = handle.domain(port).await?;
        let preview_url = start_dev_server(handle.as_ref(), &manifest, installed, &domain, logger).await;
        logger.progress(45, "Sandbox provisioned").await;

        Ok(ProvisionOutcome::Ready(ProvisionedSandbox {
            handle,
            domain,
            preview_url,
            branch: request.branch.clone(),
            dependencies: installed,
        }))
    }

    async fn plan_manifest(&self, repo_url: &RepositoryUrl, logger: &ProgressLogger) -> RepoManifest {
        match self.inspector.fetch_manifest(repo_url).await {
            Ok(manifest) => manifest,
            Err(err) => {
                logger
                    .info(format!(
                        "Could not inspect repository ({err}), using port {DEFAULT_DEV_PORT}"
                    ))
                    .await;
                RepoManifest::new()
            }
        }
    }

    async fn create(
        &self,
        request: &ProvisionRequest<'_>,
        planned: &RepoManifest,
        port: u16,
        logger: &ProgressLogger,
    ) -> Result<Arc<dyn SandboxHandle>, ProvisionError> {
        let runtime = if planned.package_json().is_none() && planned.requirements().is_some() {
            SandboxRuntime::Python
        } else {
            SandboxRuntime::Node
        };
        let create_request = SandboxCreateRequest {
            source: SandboxSource {
                repo_url: request.repo_url.clone(),
                revision: None,
                depth: self.settings.clone_depth,
            },
            resources: ResourceSpec {
                vcpus: self.settings.vcpus,
                runtime,
                ports: vec![port],
            },
            timeout: self.settings.sandbox_timeout,
        };

        let handle = self
            .service
            .create(&create_request)
            .await
            .map_err(ProvisionError::Creation)?;
        if let Some(previous) = self.registry.register(request.task_id, Arc::clone(&handle)) {
            tracing::warn!(sandbox_id = %previous.id(), "replaced a registered sandbox");
        }
        logger
            .success(format!("Sandbox {} created", handle.id()))
            .await;
        Ok(handle)
    }

    async fn configure_git(&self, handle: &dyn SandboxHandle) -> Result<(), ProvisionError> {
        let identity = [
            ("user.name", self.settings.git_author_name.as_str()),
            ("user.email", self.settings.git_author_email.as_str()),
        ];
        for (key, value) in identity {
            let command = SandboxCommand::new("git").args(["config", key, value]);
            let output = handle.run_command(&command).await?;
            if !output.succeeded() {
                return Err(ProvisionError::GitSetup(output.diagnostic().to_owned()));
            }
        }
        Ok(())
    }
}

async fn checkout_branch(
    handle: &dyn SandboxHandle,
    request: &ProvisionRequest<'_>,
    logger: &ProgressLogger,
) -> Result<(), ProvisionError> {
    let branch = request.branch.as_str();
    if request.existing_branch {
        let fetch = SandboxCommand::new("git").args(["fetch", "origin", branch]);
        logger.command(fetch.command_line()).await;
        let fetched = handle.run_command(&fetch).await?;
        if fetched.succeeded() {
            let checkout = SandboxCommand::new("git").args(["checkout", "-B", branch, "FETCH_HEAD"]);
            let output = handle.run_command(&checkout).await?;
            if output.succeeded() {
                logger.success(format!("Checked out existing branch {branch}")).await;
                return Ok(());
            }
        }
        logger
            .info(format!("Branch {branch} not found on remote, creating it"))
            .await;
    }

    let create = SandboxCommand::new("git").args(["checkout", "-b", branch]);
    logger.command(create.command_line()).await;
    let output = handle.run_command(&create).await?;
    if output.succeeded() {
        logger.success(format!("Created branch {branch}")).await;
        return Ok(());
    }
    Err(ProvisionError::Branch {
        branch: request.branch.clone(),
        reason: output.diagnostic().to_owned(),
    })
}

async fn start_dev_server(
    handle: &dyn SandboxHandle,
    manifest: &RepoManifest,
    installed: DependencyInstall,
    domain: &str,
    logger: &ProgressLogger,
) -> Option<String> {
    let manager = installed.node_manager()?;
    manifest.script("dev")?;

    let command = manager.run_script("dev");
    logger.command(command.command_line()).await;
    match handle.spawn_detached(&command).await {
        Ok(()) => {
            logger.success(format!("Dev server starting at {domain}")).await;
            Some(domain.to_owned())
        }
        Err(err) => {
            logger.error(format!("Failed to start dev server: {err}")).await;
            None
        }
    }
}
