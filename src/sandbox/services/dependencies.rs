//! Dependency detection and installation inside a sandbox.

use crate::sandbox::{
    domain::{PackageManager, SandboxCommand},
    ports::SandboxHandle,
};
use crate::task::services::ProgressLogger;
use crate::vcs::domain::RepoManifest;

/// Outcome of the dependency step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyInstall {
    /// Node dependencies installed with the given manager.
    Node(PackageManager),
    /// Python requirements installed.
    Python,
    /// No recognised manifest.
    NoManifest,
    /// Installation was attempted and failed.
    Failed,
}

impl DependencyInstall {
    /// Returns the manager used for a successful Node install.
    #[must_use]
    pub const fn node_manager(self) -> Option<PackageManager> {
        match self {
            Self::Node(manager) => Some(manager),
            Self::Python | Self::NoManifest | Self::Failed => None,
        }
    }
}

/// Reads the project manifests from the sandbox working tree.
pub async fn read_manifest(handle: &dyn SandboxHandle) -> RepoManifest {
    let mut manifest = RepoManifest::new();
    if let Some(raw) = read_optional(handle, "package.json").await {
        match serde_json::from_str(&raw) {
            Ok(parsed) => manifest = manifest.with_package_json(parsed),
            Err(err) => tracing::warn!(error = %err, "package.json is not valid JSON"),
        }
    }
    if let Some(requirements) = read_optional(handle, "requirements.txt").await {
        manifest = manifest.with_requirements(requirements);
    }
    manifest
}

/// Picks the package manager from the lockfiles present, or `default`.
pub async fn detect_package_manager(
    handle: &dyn SandboxHandle,
    default: PackageManager,
) -> PackageManager {
    for (lockfile, manager) in PackageManager::LOCKFILES {
        if read_optional(handle, lockfile).await.is_some() {
            return manager;
        }
    }
    default
}

/// Installs project dependencies.
///
/// A failing install with the detected manager is retried once with
/// `default` unless they are the same. Failure is reported, never raised.
pub async fn install_dependencies(
    handle: &dyn SandboxHandle,
    manifest: &RepoManifest,
    default: PackageManager,
    logger: &ProgressLogger,
) -> DependencyInstall {
    if manifest.package_json().is_some() {
        let detected = detect_package_manager(handle, default).await;
        if run_install(handle, &detected.install_command(), logger).await {
            return DependencyInstall::Node(detected);
        }
        if detected != default {
            logger
                .info(format!("{detected} install failed, retrying with {default}"))
                .await;
            if run_install(handle, &default.install_command(), logger).await {
                return DependencyInstall::Node(default);
            }
        }
        logger
            .error("Dependency installation failed, continuing without dependencies")
            .await;
        return DependencyInstall::Failed;
    }

    if manifest.requirements().is_some() {
        let pip = SandboxCommand::new("pip").args(["install", "-r", "requirements.txt"]);
        if run_install(handle, &pip, logger).await {
            return DependencyInstall::Python;
        }
        logger
            .error("Python requirements installation failed, continuing")
            .await;
        return DependencyInstall::Failed;
    }

    logger.info("No dependency manifest found").await;
    DependencyInstall::NoManifest
}

async fn run_install(
    handle: &dyn SandboxHandle,
    command: &SandboxCommand,
    logger: &ProgressLogger,
) -> bool {
    logger.command(command.command_line()).await;
    match handle.run_command(command).await {
        Ok(output) if output.succeeded() => {
            logger.success(format!("{} succeeded", command.command_line())).await;
            true
        }
        Ok(output) => {
            logger
                .error(format!(
                    "{} exited with {}: {}",
                    command.command_line(),
                    output.exit_code,
                    output.diagnostic()
                ))
                .await;
            false
        }
        Err(err) => {
            logger
                .error(format!("{} could not run: {err}", command.command_line()))
                .await;
            false
        }
    }
}

async fn read_optional(handle: &dyn SandboxHandle, path: &str) -> Option<String> {
    match handle.read_file(path).await {
        Ok(contents) => contents,
        Err(err) => {
            tracing::debug!(path, error = %err, "treating unreadable file as absent");
            None
        }
    }
}
