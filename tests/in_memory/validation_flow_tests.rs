//! End-to-end validation workflow flows over the in-memory adapters.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use super::helpers::TestContext;
use chantier::workflow::domain::{NotificationKind, Progress, TaskStatus};
use chantier::workflow::ports::{TransitionRecord, WorkflowStore, WorkflowStoreError};
use chantier::workflow::services::{RejectTaskRequest, UpdateProgressRequest};
use chantier::workflow::surface::{ErrorKind, FailurePayload};

#[tokio::test(flavor = "multi_thread")]
async fn submitting_at_one_hundred_forces_awaiting_validation_and_notifies_the_manager() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, manager, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    assert_eq!(task.status(), TaskStatus::Todo);
    assert_eq!(task.progress(), Progress::ZERO);

    let submitted = ctx.submit_task(&task, &developer_caps).await;

    assert_eq!(submitted.status(), TaskStatus::AwaitingValidation);
    assert_eq!(submitted.progress(), Progress::COMPLETE);

    let manager_notifications = ctx
        .store
        .notifications_for(manager.id())
        .await
        .expect("notification lookup");
    assert_eq!(manager_notifications.len(), 1);
    let notification = manager_notifications.first().expect("one notification");
    assert_eq!(notification.kind(), NotificationKind::AwaitingValidation);
    assert_eq!(notification.task_id(), Some(task.id()));
    assert_eq!(notification.actor(), Some(developer.id()));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejection_returns_the_task_with_a_comment_and_a_reasoned_notification() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.submit_task(&task, &developer_caps).await;

    let rejected = ctx
        .engine
        .reject_task(
            RejectTaskRequest::new(task.id(), "incomplete docs"),
            &manager_caps,
        )
        .await
        .expect("rejection should succeed");

    assert_eq!(rejected.status(), TaskStatus::InProgress);
    assert!(rejected.rejected_at().is_some());
    assert!(rejected.validated_by().is_none());
    assert!(rejected.validated_at().is_none());

    let comments = ctx
        .store
        .comments_for_task(task.id())
        .await
        .expect("comment lookup");
    assert_eq!(comments.len(), 1);
    assert_eq!(
        comments.first().expect("one comment").body().as_str(),
        "incomplete docs"
    );

    let developer_notifications = ctx
        .store
        .notifications_for(developer.id())
        .await
        .expect("notification lookup");
    let rejection = developer_notifications
        .iter()
        .find(|notification| notification.kind() == NotificationKind::Rejected)
        .expect("rejection notification");
    assert!(rejection.body().contains("incomplete docs"));
}

#[tokio::test(flavor = "multi_thread")]
async fn validation_stamps_the_validator_and_timestamp() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, manager, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.submit_task(&task, &developer_caps).await;

    let validated = ctx
        .engine
        .validate_task(task.id(), &manager_caps)
        .await
        .expect("validation should succeed");

    assert_eq!(validated.status(), TaskStatus::Validated);
    assert_eq!(validated.validated_by(), Some(manager.id()));
    assert!(validated.validated_at().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn round_trip_creates_one_notification_per_transition() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, manager, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;

    // assign → awaiting-validation → rejected → awaiting-validation →
    // validated, one notification each.
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.submit_task(&task, &developer_caps).await;
    ctx.engine
        .reject_task(RejectTaskRequest::new(task.id(), "not yet"), &manager_caps)
        .await
        .expect("rejection");
    ctx.engine
        .update_progress(UpdateProgressRequest::new(task.id(), 100), &developer_caps)
        .await
        .expect("resubmission");
    let validated = ctx
        .engine
        .validate_task(task.id(), &manager_caps)
        .await
        .expect("validation");
    assert_eq!(validated.status(), TaskStatus::Validated);

    let developer_kinds: Vec<NotificationKind> = ctx
        .store
        .notifications_for(developer.id())
        .await
        .expect("lookup")
        .iter()
        .map(chantier::workflow::domain::Notification::kind)
        .collect();
    let assigned = developer_kinds
        .iter()
        .filter(|kind| **kind == NotificationKind::Assigned)
        .count();
    let rejected = developer_kinds
        .iter()
        .filter(|kind| **kind == NotificationKind::Rejected)
        .count();
    let validated_count = developer_kinds
        .iter()
        .filter(|kind| **kind == NotificationKind::Validated)
        .count();
    assert_eq!((assigned, rejected, validated_count), (1, 1, 1));

    let manager_kinds: Vec<NotificationKind> = ctx
        .store
        .notifications_for(manager.id())
        .await
        .expect("lookup")
        .iter()
        .map(chantier::workflow::domain::Notification::kind)
        .collect();
    let awaiting = manager_kinds
        .iter()
        .filter(|kind| **kind == NotificationKind::AwaitingValidation)
        .count();
    assert_eq!(awaiting, 2, "one per submission");
}

#[tokio::test(flavor = "multi_thread")]
async fn assigned_manager_without_membership_flag_may_validate() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.submit_task(&task, &developer_caps).await;

    // A second manager holds no membership flag but is assigned on the
    // project row itself.
    let (outside_manager, _) = ctx
        .user_with_capabilities("pm2", chantier::directory::domain::Role::ProjectManager)
        .await;
    ctx.projects
        .assign_manager(project.id(), outside_manager.id(), &manager_caps)
        .await
        .expect("manager assignment");
    let outside_caps = ctx.refreshed_capabilities(&outside_manager).await;

    let validated = ctx
        .engine
        .validate_task(task.id(), &outside_caps)
        .await
        .expect("assigned manager authority should suffice");
    assert_eq!(validated.validated_by(), Some(outside_manager.id()));
}

#[tokio::test(flavor = "multi_thread")]
async fn a_losing_concurrent_transition_fails_stale_and_persists_nothing() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;

    // Two callers read the same Todo snapshot; the first commit wins.
    let winner = ctx
        .engine
        .update_progress(UpdateProgressRequest::new(task.id(), 40), &developer_caps)
        .await
        .expect("winning update");

    let mut stale_task = task.clone();
    stale_task
        .record_progress(
            Progress::new(70).expect("in range"),
            None,
            &mockable::DefaultClock,
        )
        .expect("domain transition");
    let result = ctx
        .store
        .commit_transition(TransitionRecord {
            expected_status: task.status(),
            expected_progress: task.progress(),
            task: stale_task,
            comment: None,
            notifications: Vec::new(),
        })
        .await;

    assert!(matches!(
        result,
        Err(WorkflowStoreError::StaleTransition { task_id }) if task_id == task.id()
    ));
    let stored = ctx
        .store
        .find_task(task.id())
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(stored, winner, "the losing write must not overwrite");
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_operations_serialize_into_the_failure_payload() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.submit_task(&task, &developer_caps).await;

    let err = ctx
        .engine
        .update_progress(UpdateProgressRequest::new(task.id(), 10), &developer_caps)
        .await
        .expect_err("locked task must refuse assignee edits");

    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(err.kind().http_status(), 409);
    let payload = FailurePayload::from(&err);
    assert!(!payload.success);
    assert_eq!(payload.error_kind, "invalid_state");
    assert!(payload.message.contains("locked"));

    let forbidden = ctx
        .engine
        .validate_task(task.id(), &developer_caps)
        .await
        .expect_err("developers must not validate");
    assert_eq!(forbidden.kind(), ErrorKind::Forbidden);

    let missing = ctx
        .engine
        .validate_task(chantier::workflow::domain::TaskId::new(), &manager_caps)
        .await
        .expect_err("unknown task");
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}
