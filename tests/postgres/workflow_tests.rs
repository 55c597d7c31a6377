//! Task round-trips and guarded transition commits against `PostgreSQL`.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use super::helpers::{pg_harness, sample_user, seed_project, seed_task};
use chantier::workflow::domain::{Comment, CommentBody, Notification, NotificationKind, Progress, TaskStatus};
use chantier::workflow::ports::{TransitionRecord, WorkflowStore, WorkflowStoreError};
use chantier::directory::ports::DirectoryRepository;
use chantier::directory::domain::Role;
use mockable::DefaultClock;

#[tokio::test(flavor = "multi_thread")]
async fn tasks_round_trip_with_validation_and_rejection_fields() {
    let harness = pg_harness();
    let (creator, _, project) = seed_project(&harness).await;
    let clock = DefaultClock;

    let mut task = seed_task(&harness, &project, &creator).await;
    task.record_progress(Progress::new(60).expect("in range"), None, &clock)
        .expect("partial progress");
    task.record_progress(Progress::COMPLETE, None, &clock)
        .expect("submission");
    harness
        .store
        .commit_transition(TransitionRecord {
            expected_status: TaskStatus::Todo,
            expected_progress: Progress::ZERO,
            task: task.clone(),
            comment: None,
            notifications: Vec::new(),
        })
        .await
        .expect("commit");

    let fetched = harness
        .store
        .find_task(task.id())
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(fetched.status(), TaskStatus::AwaitingValidation);
    assert_eq!(fetched.progress(), Progress::COMPLETE);
    assert_eq!(
        fetched.resumption_progress(),
        Progress::new(60).expect("in range")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn a_stale_commit_changes_nothing() {
    let harness = pg_harness();
    let (creator, _, project) = seed_project(&harness).await;
    let clock = DefaultClock;
    let task = seed_task(&harness, &project, &creator).await;

    // A winning writer moves the task to 40%.
    let mut winner = task.clone();
    winner
        .record_progress(Progress::new(40).expect("in range"), None, &clock)
        .expect("progress");
    harness
        .store
        .commit_transition(TransitionRecord {
            expected_status: TaskStatus::Todo,
            expected_progress: Progress::ZERO,
            task: winner.clone(),
            comment: None,
            notifications: Vec::new(),
        })
        .await
        .expect("winning commit");

    // A second writer still holds the Todo snapshot.
    let mut loser = task.clone();
    loser
        .record_progress(Progress::new(70).expect("in range"), None, &clock)
        .expect("progress");
    let reason_comment = Comment::new(
        task.id(),
        creator.id(),
        CommentBody::new("should not persist", 2000).expect("valid body"),
        &clock,
    );
    let stray_notification = Notification::new(
        creator.id(),
        NotificationKind::Info,
        "should not persist",
        &clock,
    );
    let result = harness
        .store
        .commit_transition(TransitionRecord {
            expected_status: TaskStatus::Todo,
            expected_progress: Progress::ZERO,
            task: loser,
            comment: Some(reason_comment),
            notifications: vec![stray_notification],
        })
        .await;

    assert!(matches!(
        result,
        Err(WorkflowStoreError::StaleTransition { task_id }) if task_id == task.id()
    ));

    // The losing transition's task, comment, and notification are all absent.
    let stored = harness
        .store
        .find_task(task.id())
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(stored.progress(), Progress::new(40).expect("in range"));
    assert!(
        harness
            .store
            .comments_for_task(task.id())
            .await
            .expect("comments")
            .is_empty()
    );
    assert_eq!(
        harness
            .store
            .unread_count(creator.id())
            .await
            .expect("unread"),
        0
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn transition_commits_persist_comment_and_notifications_together() {
    let harness = pg_harness();
    let (creator, _, project) = seed_project(&harness).await;
    let clock = DefaultClock;
    let assignee = sample_user("dev", Role::Developer);
    harness
        .directory
        .insert_user(&assignee)
        .await
        .expect("assignee");
    let task = seed_task(&harness, &project, &assignee).await;

    let mut submitted = task.clone();
    submitted
        .record_progress(Progress::COMPLETE, None, &clock)
        .expect("submission");
    harness
        .store
        .commit_transition(TransitionRecord {
            expected_status: TaskStatus::Todo,
            expected_progress: Progress::ZERO,
            task: submitted.clone(),
            comment: None,
            notifications: Vec::new(),
        })
        .await
        .expect("submission commit");

    let mut rejected = submitted.clone();
    rejected
        .send_back(Progress::ZERO, &clock)
        .expect("rejection");
    let comment = Comment::new(
        task.id(),
        creator.id(),
        CommentBody::new("incomplete docs", 2000).expect("valid body"),
        &clock,
    );
    let notification = Notification::new(
        assignee.id(),
        NotificationKind::Rejected,
        "sent back: incomplete docs",
        &clock,
    )
    .with_project(project.id())
    .with_task(task.id())
    .with_actor(creator.id());
    harness
        .store
        .commit_transition(TransitionRecord {
            expected_status: TaskStatus::AwaitingValidation,
            expected_progress: Progress::COMPLETE,
            task: rejected,
            comment: Some(comment),
            notifications: vec![notification],
        })
        .await
        .expect("rejection commit");

    let comments = harness
        .store
        .comments_for_task(task.id())
        .await
        .expect("comments");
    assert_eq!(comments.len(), 1);
    let notifications = harness
        .store
        .notifications_for(assignee.id())
        .await
        .expect("notifications");
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications.first().expect("one").kind(),
        NotificationKind::Rejected
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn progress_out_of_schema_range_is_rejected_by_the_check_constraint() {
    let harness = pg_harness();
    let (creator, _, project) = seed_project(&harness).await;
    let task = seed_task(&harness, &project, &creator).await;

    // Bypass the domain and write an inconsistent pair straight at the
    // store: status says awaiting validation, progress says 50.
    let mut tampered = task.clone();
    tampered
        .record_progress(Progress::COMPLETE, None, &DefaultClock)
        .expect("submission");
    let record = TransitionRecord {
        expected_status: TaskStatus::Todo,
        expected_progress: Progress::new(50).expect("in range"),
        task: tampered,
        comment: None,
        notifications: Vec::new(),
    };

    // The expectation mismatch alone must already refuse the write.
    let result = harness.store.commit_transition(record).await;
    assert!(matches!(
        result,
        Err(WorkflowStoreError::StaleTransition { .. })
    ));
}
