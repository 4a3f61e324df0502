//! Then steps for task lifecycle BDD scenarios.

use super::world::LifecycleWorld;
use atelier::agent::domain::AgentRequest;
use atelier::task::domain::TaskStatus;
use eyre::{ensure, eyre};
use rstest_bdd_macros::then;

fn last_agent_request(world: &LifecycleWorld) -> Result<AgentRequest, eyre::Report> {
    world
        .agent
        .requests()
        .pop()
        .ok_or_else(|| eyre!("the agent never ran"))
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &LifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre!("invalid expected status in scenario: {err}"))?;
    let task = world.task()?;
    ensure!(
        task.status() == expected,
        "expected status {expected}, found {}",
        task.status()
    );
    Ok(())
}

#[then("the task progress is {value:u8}")]
fn task_progress_is(world: &LifecycleWorld, value: u8) -> Result<(), eyre::Report> {
    let progress = world.task()?.progress().value();
    ensure!(progress == value, "expected progress {value}, found {progress}");
    Ok(())
}

#[then(r#"the task error is "{message}""#)]
fn task_error_is(world: &LifecycleWorld, message: String) -> Result<(), eyre::Report> {
    let task = world.task()?;
    ensure!(
        task.error() == Some(message.as_str()),
        "expected error {message:?}, found {:?}",
        task.error()
    );
    Ok(())
}

#[then(r#"the task error mentions "{fragment}""#)]
fn task_error_mentions(world: &LifecycleWorld, fragment: String) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let error = task.error().ok_or_else(|| eyre!("task has no error"))?;
    ensure!(
        error.contains(fragment.as_str()),
        "error {error:?} does not mention {fragment:?}"
    );
    Ok(())
}

fn sandboxes_created(world: &LifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let created = world.sandboxes.created().len();
    ensure!(created == count, "expected {count} sandbox(es), found {created}");
    Ok(())
}

#[then("{count:usize} sandbox was created")]
fn one_sandbox_created(world: &LifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    sandboxes_created(world, count)
}

#[then("{count:usize} sandboxes were created")]
fn many_sandboxes_created(world: &LifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    sandboxes_created(world, count)
}

#[then("every sandbox was shut down exactly once")]
fn sandboxes_shut_down_once(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    for sandbox in world.sandboxes.created() {
        let count = sandbox.shutdown_count();
        ensure!(count == 1, "sandbox shut down {count} time(s)");
    }
    Ok(())
}

#[then("the last agent run resumed the sandbox session")]
fn last_run_resumed(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let request = last_agent_request(world)?;
    ensure!(request.is_resumed, "agent run was not resumed");
    ensure!(
        request
            .session_id
            .as_ref()
            .is_some_and(|session| session.as_str() == "sess-bdd"),
        "expected the stored session to be resumed"
    );
    Ok(())
}

#[then("the last agent run started a fresh session")]
fn last_run_fresh(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let request = last_agent_request(world)?;
    ensure!(!request.is_resumed, "agent run unexpectedly resumed");
    ensure!(request.session_id.is_none(), "agent run reused a session");
    Ok(())
}
