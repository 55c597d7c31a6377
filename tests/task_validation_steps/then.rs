//! Then steps for task validation BDD scenarios.

use super::world::{TaskValidationWorld, run_async};
use chantier::workflow::domain::{NotificationKind, TaskStatus};
use chantier::workflow::ports::WorkflowStore;
use chantier::workflow::services::WorkflowError;
use rstest_bdd_macros::then;

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskValidationWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;

    let task_id = world.current_task()?.id();
    let stored = run_async(world.store.find_task(task_id))
        .map_err(|err| eyre::eyre!("task lookup failed: {err}"))?
        .ok_or_else(|| eyre::eyre!("task vanished from the store"))?;

    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            stored.status().as_str()
        ));
    }
    Ok(())
}

fn notification_kind(value: &str) -> Result<NotificationKind, eyre::Report> {
    NotificationKind::try_from(value)
        .map_err(|err| eyre::eyre!("invalid notification kind in scenario: {err}"))
}

#[then(r#"the project manager receives an "{kind}" notification"#)]
fn manager_receives_notification(
    world: &TaskValidationWorld,
    kind: String,
) -> Result<(), eyre::Report> {
    let expected = notification_kind(&kind)?;
    let manager_id = world.manager_caps()?.user_id();
    let notifications = run_async(world.store.notifications_for(manager_id))
        .map_err(|err| eyre::eyre!("notification lookup failed: {err}"))?;
    if !notifications
        .iter()
        .any(|notification| notification.kind() == expected)
    {
        return Err(eyre::eyre!("no {} notification for the manager", kind));
    }
    Ok(())
}

#[then(r#"the developer receives a "{kind}" notification"#)]
fn developer_receives_notification(
    world: &TaskValidationWorld,
    kind: String,
) -> Result<(), eyre::Report> {
    let expected = notification_kind(&kind)?;
    let developer_id = world.developer_caps()?.user_id();
    let notifications = run_async(world.store.notifications_for(developer_id))
        .map_err(|err| eyre::eyre!("notification lookup failed: {err}"))?;
    if !notifications
        .iter()
        .any(|notification| notification.kind() == expected)
    {
        return Err(eyre::eyre!("no {} notification for the developer", kind));
    }
    Ok(())
}

#[then(r#"a comment "{body}" is attached to the task"#)]
fn comment_is_attached(world: &TaskValidationWorld, body: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let comments = run_async(world.store.comments_for_task(task_id))
        .map_err(|err| eyre::eyre!("comment lookup failed: {err}"))?;
    if !comments
        .iter()
        .any(|comment| comment.body().as_str() == body)
    {
        return Err(eyre::eyre!("no comment with body '{body}'"));
    }
    Ok(())
}

#[then("the task validator is the project manager")]
fn validator_is_the_manager(world: &TaskValidationWorld) -> Result<(), eyre::Report> {
    let manager_id = world.manager_caps()?.user_id();
    let task = world.current_task()?;
    if task.validated_by() != Some(manager_id) {
        return Err(eyre::eyre!("task was not validated by the manager"));
    }
    if task.validated_at().is_none() {
        return Err(eyre::eyre!("validation timestamp was not stamped"));
    }
    Ok(())
}

#[then("the operation fails as forbidden")]
fn operation_fails_forbidden(world: &TaskValidationWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing operation result"))?;
    if !matches!(result, Err(WorkflowError::Forbidden { .. })) {
        return Err(eyre::eyre!("expected Forbidden, got {result:?}"));
    }
    Ok(())
}
