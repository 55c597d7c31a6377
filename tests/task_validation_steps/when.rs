//! When steps for task validation BDD scenarios.

use super::world::{TaskValidationWorld, run_async};
use chantier::workflow::services::{RejectTaskRequest, UpdateProgressRequest};
use rstest_bdd_macros::when;

#[when("the developer records progress {progress:u8}")]
fn developer_records_progress(
    world: &mut TaskValidationWorld,
    progress: u8,
) -> Result<(), eyre::Report> {
    let developer_caps = world.developer_caps()?.clone();
    let task_id = world.current_task()?.id();
    let result = run_async(
        world
            .engine
            .update_progress(UpdateProgressRequest::new(task_id, progress), &developer_caps),
    );
    if let Ok(ref updated) = result {
        world.task = Some(updated.clone());
    }
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"the project manager rejects the task with reason "{reason}""#)]
fn manager_rejects_task(
    world: &mut TaskValidationWorld,
    reason: String,
) -> Result<(), eyre::Report> {
    let manager_caps = world.manager_caps()?.clone();
    let task_id = world.current_task()?.id();
    let result = run_async(
        world
            .engine
            .reject_task(RejectTaskRequest::new(task_id, reason), &manager_caps),
    );
    if let Ok(ref updated) = result {
        world.task = Some(updated.clone());
    }
    world.last_result = Some(result);
    Ok(())
}

#[when("the project manager validates the task")]
fn manager_validates_task(world: &mut TaskValidationWorld) -> Result<(), eyre::Report> {
    let manager_caps = world.manager_caps()?.clone();
    let task_id = world.current_task()?.id();
    let result = run_async(world.engine.validate_task(task_id, &manager_caps));
    if let Ok(ref updated) = result {
        world.task = Some(updated.clone());
    }
    world.last_result = Some(result);
    Ok(())
}

#[when("the developer attempts to validate the task")]
fn developer_attempts_validation(world: &mut TaskValidationWorld) -> Result<(), eyre::Report> {
    let developer_caps = world.developer_caps()?.clone();
    let task_id = world.current_task()?.id();
    let result = run_async(world.engine.validate_task(task_id, &developer_caps));
    world.last_result = Some(result);
    Ok(())
}
