//! Derived project progress and reporting aggregates.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use super::helpers::{TestContext, date};
use chantier::workflow::domain::{Priority, Progress};
use chantier::workflow::services::{CreateTaskRequest, UpdateProgressRequest};

#[tokio::test(flavor = "multi_thread")]
async fn a_project_without_tasks_reports_zero_progress() {
    let ctx = TestContext::new();
    let (team, _, _, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;

    let progress = ctx
        .engine
        .project_progress(project.id())
        .await
        .expect("derived progress");

    assert_eq!(progress, Progress::ZERO);
}

#[tokio::test(flavor = "multi_thread")]
async fn project_progress_is_the_rounded_mean_of_task_progress() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;

    for (name, value) in [("alpha", 30_u8), ("beta", 50), ("gamma", 100)] {
        let task = ctx
            .engine
            .create_task(
                CreateTaskRequest::new(project.id(), name, date(2026, 9, 30), Priority::Medium)
                    .with_assignee(developer.id()),
                &manager_caps,
            )
            .await
            .expect("task");
        ctx.engine
            .update_progress(UpdateProgressRequest::new(task.id(), value), &developer_caps)
            .await
            .expect("progress");
    }

    let progress = ctx
        .engine
        .project_progress(project.id())
        .await
        .expect("derived progress");

    assert_eq!(progress, Progress::new(60).expect("in range"));
}

#[tokio::test(flavor = "multi_thread")]
async fn derived_progress_is_a_pure_read() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, manager, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.engine
        .update_progress(UpdateProgressRequest::new(task.id(), 40), &developer_caps)
        .await
        .expect("progress");

    let first = ctx
        .engine
        .project_progress(project.id())
        .await
        .expect("first read");
    let second = ctx
        .engine
        .project_progress(project.id())
        .await
        .expect("second read");
    assert_eq!(first, second);

    // Reads must leave no side effects behind.
    let developer_unread = ctx
        .engine
        .unread_count(developer.id())
        .await
        .expect("count");
    let manager_unread = ctx.engine.unread_count(manager.id()).await.expect("count");
    assert_eq!(developer_unread, 1, "only the assignment notification");
    assert_eq!(manager_unread, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn statistics_break_tasks_down_by_status_and_overdue() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;

    // One untouched task, far in the future.
    ctx.engine
        .create_task(
            CreateTaskRequest::new(project.id(), "todo", date(2030, 1, 1), Priority::Low)
                .with_assignee(developer.id()),
            &manager_caps,
        )
        .await
        .expect("task");

    // One in progress and already past its due date.
    let overdue = ctx
        .engine
        .create_task(
            CreateTaskRequest::new(project.id(), "late", date(2020, 1, 1), Priority::High)
                .with_assignee(developer.id()),
            &manager_caps,
        )
        .await
        .expect("task");
    ctx.engine
        .update_progress(UpdateProgressRequest::new(overdue.id(), 50), &developer_caps)
        .await
        .expect("progress");

    // One validated despite a past due date: finished work is never overdue.
    let finished = ctx
        .engine
        .create_task(
            CreateTaskRequest::new(project.id(), "done", date(2020, 1, 1), Priority::High)
                .with_assignee(developer.id()),
            &manager_caps,
        )
        .await
        .expect("task");
    ctx.engine
        .update_progress(UpdateProgressRequest::new(finished.id(), 100), &developer_caps)
        .await
        .expect("submission");
    ctx.engine
        .validate_task(finished.id(), &manager_caps)
        .await
        .expect("validation");

    let statistics = ctx
        .engine
        .project_statistics(project.id())
        .await
        .expect("statistics");

    assert_eq!(statistics.task_count, 3);
    assert_eq!(statistics.todo, 1);
    assert_eq!(statistics.in_progress, 1);
    assert_eq!(statistics.awaiting_validation, 0);
    assert_eq!(statistics.validated, 1);
    assert_eq!(statistics.overdue, 1);
    assert_eq!(statistics.progress, Progress::new(50).expect("in range"));
}
