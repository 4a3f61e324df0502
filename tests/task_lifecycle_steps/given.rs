//! Given steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, session_agent};
use atelier::agent::adapters::ScriptedAgentRuntime;
use atelier::vcs::adapters::memory::RecordingGitPublisher;
use rstest_bdd_macros::given;

#[given(r#"a repository "{url}""#)]
fn repository(world: &mut LifecycleWorld, url: String) {
    world.repo_url = url;
}

#[given("an agent that succeeds")]
fn succeeding_agent(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    world.agent = session_agent()?;
    Ok(())
}

#[given(r#"an agent that fails with "{message}""#)]
fn failing_agent(world: &mut LifecycleWorld, message: String) {
    world.agent = ScriptedAgentRuntime::failing(message);
}

#[given("a remote that rejects pushes")]
fn rejecting_remote(world: &mut LifecycleWorld) {
    world.publisher = RecordingGitPublisher::rejecting();
}

#[given("sandboxes are kept alive")]
fn sandboxes_kept_alive(world: &mut LifecycleWorld) {
    world.keep_alive = true;
}
