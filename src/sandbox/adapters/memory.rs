//! In-memory sandbox service for tests and local runs.
//!
//! Sandboxes are scripted: commands are matched by prefix against canned
//! outputs and files are served from a map seeded on the service.

use crate::sandbox::{
    domain::{CommandOutput, SandboxCommand, SandboxCreateRequest, SandboxId},
    ports::{SandboxError, SandboxHandle, SandboxResult, SandboxService},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default)]
struct SandboxScript {
    files: HashMap<String, String>,
    responses: Vec<(String, CommandOutput)>,
}

/// Scripted in-memory sandbox service.
#[derive(Debug, Clone, Default)]
pub struct InMemorySandboxService {
    script: SandboxScript,
    state: Arc<RwLock<ServiceState>>,
    fail_creation: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
struct ServiceState {
    sandboxes: HashMap<SandboxId, Arc<InMemorySandbox>>,
    requests: Vec<SandboxCreateRequest>,
    next_id: usize,
}

impl InMemorySandboxService {
    /// Creates a service whose sandboxes succeed at every command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `path` with `contents` in every sandbox created afterwards.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.script.files.insert(path.into(), contents.into());
        self
    }

    /// Answers commands whose command line starts with `prefix` with
    /// `output`. Earlier registrations win.
    #[must_use]
    pub fn with_response(mut self, prefix: impl Into<String>, output: CommandOutput) -> Self {
        self.script.responses.push((prefix.into(), output));
        self
    }

    /// Makes every subsequent `create` fail.
    pub fn fail_creation(&self) {
        self.fail_creation.store(true, Ordering::SeqCst);
    }

    /// Returns all sandboxes created so far, in creation order.
    #[must_use]
    pub fn created(&self) -> Vec<Arc<InMemorySandbox>> {
        self.state
            .read()
            .map(|state| {
                let mut sandboxes: Vec<_> = state.sandboxes.values().cloned().collect();
                sandboxes.sort_by_key(|sandbox| sandbox.sequence);
                sandboxes
            })
            .unwrap_or_default()
    }

    /// Returns the create requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<SandboxCreateRequest> {
        self.state
            .read()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    /// Returns the sandbox with `id`.
    #[must_use]
    pub fn sandbox(&self, id: &SandboxId) -> Option<Arc<InMemorySandbox>> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.sandboxes.get(id).cloned())
    }

    /// Simulates provider-side expiry of `id`.
    pub fn expire(&self, id: &SandboxId) {
        if let Some(sandbox) = self.sandbox(id) {
            sandbox.expired.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl SandboxService for InMemorySandboxService {
    async fn create(
        &self,
        request: &SandboxCreateRequest,
    ) -> SandboxResult<Arc<dyn SandboxHandle>> {
        if self.fail_creation.load(Ordering::SeqCst) {
            return Err(SandboxError::Creation("sandbox quota exhausted".to_owned()));
        }
        let mut state = self
            .state
            .write()
            .map_err(|err| SandboxError::runtime(std::io::Error::other(err.to_string())))?;
        state.next_id = state.next_id.saturating_add(1);
        let sandbox = Arc::new(InMemorySandbox::new(
            SandboxId::new(format!("sbx-{}", state.next_id)),
            state.next_id,
            self.script.clone(),
        ));
        state.requests.push(request.clone());
        state
            .sandboxes
            .insert(sandbox.id.clone(), Arc::clone(&sandbox));
        Ok(sandbox)
    }

    async fn get(&self, id: &SandboxId) -> SandboxResult<Arc<dyn SandboxHandle>> {
        let sandbox = self
            .sandbox(id)
            .ok_or_else(|| SandboxError::NotFound(id.clone()))?;
        if sandbox.is_stopped() {
            return Err(SandboxError::Unavailable(id.clone()));
        }
        Ok(sandbox)
    }
}

/// A scripted sandbox.
#[derive(Debug)]
pub struct InMemorySandbox {
    id: SandboxId,
    sequence: usize,
    responses: Vec<(String, CommandOutput)>,
    files: RwLock<HashMap<String, String>>,
    commands: RwLock<Vec<String>>,
    detached: RwLock<Vec<String>>,
    shutdowns: AtomicUsize,
    expired: AtomicBool,
}

impl InMemorySandbox {
    fn new(id: SandboxId, sequence: usize, script: SandboxScript) -> Self {
        Self {
            id,
            sequence,
            responses: script.responses,
            files: RwLock::new(script.files),
            commands: RwLock::new(Vec::new()),
            detached: RwLock::new(Vec::new()),
            shutdowns: AtomicUsize::new(0),
            expired: AtomicBool::new(false),
        }
    }

    /// Returns the command lines run so far.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .read()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    /// Returns the command lines launched in the background.
    #[must_use]
    pub fn detached(&self) -> Vec<String> {
        self.detached
            .read()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    /// Returns how many times `shutdown` was called.
    #[must_use]
    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    /// Returns `true` once the sandbox was shut down or expired.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shutdown_count() > 0 || self.expired.load(Ordering::SeqCst)
    }

    /// Returns the current contents of `path`.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<String> {
        self.files
            .read()
            .ok()
            .and_then(|files| files.get(path).cloned())
    }

    fn ensure_running(&self) -> SandboxResult<()> {
        if self.is_stopped() {
            return Err(SandboxError::Unavailable(self.id.clone()));
        }
        Ok(())
    }

    fn respond(&self, command_line: &str) -> CommandOutput {
        self.responses
            .iter()
            .find(|(prefix, _)| command_line.starts_with(prefix.as_str()))
            .map_or_else(|| CommandOutput::success(""), |(_, output)| output.clone())
    }
}

fn lock_error(err: impl std::fmt::Display) -> SandboxError {
    SandboxError::runtime(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SandboxHandle for InMemorySandbox {
    fn id(&self) -> &SandboxId {
        &self.id
    }

    async fn run_command(&self, command: &SandboxCommand) -> SandboxResult<CommandOutput> {
        self.ensure_running()?;
        let line = command.command_line();
        self.commands.write().map_err(lock_error)?.push(line.clone());
        Ok(self.respond(&line))
    }

    async fn spawn_detached(&self, command: &SandboxCommand) -> SandboxResult<()> {
        self.ensure_running()?;
        self.detached
            .write()
            .map_err(lock_error)?
            .push(command.command_line());
        Ok(())
    }

    async fn read_file(&self, path: &str) -> SandboxResult<Option<String>> {
        self.ensure_running()?;
        Ok(self.files.read().map_err(lock_error)?.get(path).cloned())
    }

    async fn write_file(&self, path: &str, contents: &str) -> SandboxResult<()> {
        self.ensure_running()?;
        self.files
            .write()
            .map_err(lock_error)?
            .insert(path.to_owned(), contents.to_owned());
        Ok(())
    }

    async fn domain(&self, port: u16) -> SandboxResult<String> {
        self.ensure_running()?;
        Ok(format!("https://{}-{port}.sandbox.test", self.id))
    }

    async fn shutdown(&self) -> SandboxResult<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
