//! When steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use atelier::orchestrator::{ContinueTaskRequest, CreateTaskRequest};
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::when;

#[when(r#"a task is created with prompt "{prompt}""#)]
fn create_task(world: &mut LifecycleWorld, prompt: String) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new("user-bdd", world.repo_url.as_str(), prompt)
        .keep_alive(world.keep_alive);
    let job = run_async(world.orchestrator().create_task(request)).wrap_err("create task")?;
    world.task_id = Some(job.task_id());
    world.job = Some(job);
    Ok(())
}

#[when(r#"the follow-up "{message}" is sent"#)]
fn send_follow_up(world: &mut LifecycleWorld, message: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let job = run_async(
        world
            .orchestrator()
            .continue_task(ContinueTaskRequest::new(task_id, message)),
    )
    .wrap_err("continue task")?;
    world.job = Some(job);
    Ok(())
}

#[when("the task run finishes")]
fn run_finishes(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let job = world
        .job
        .take()
        .ok_or_else(|| eyre!("no running job in scenario world"))?;
    run_async(job.wait()).wrap_err("join task run")?;
    Ok(())
}

#[when("the task sandbox expires")]
fn sandbox_expires(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let sandbox_id = task
        .sandbox_id()
        .ok_or_else(|| eyre!("task has no sandbox to expire"))?;
    world.sandboxes.expire(sandbox_id);
    Ok(())
}
