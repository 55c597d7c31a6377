//! Foreign-key cascade, restrict, and set-null rules against `PostgreSQL`.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use super::helpers::{pg_harness, sample_user, seed_project, seed_task};
use chantier::directory::domain::Role;
use chantier::directory::ports::DirectoryRepository;
use chantier::workflow::domain::{
    Comment, CommentBody, ContentDigest, FileName, Notification, NotificationKind,
    ProjectDocument,
};
use chantier::workflow::ports::WorkflowStore;
use mockable::DefaultClock;

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_cascades_tasks_comments_and_documents() {
    let harness = pg_harness();
    let (creator, _, project) = seed_project(&harness).await;
    let clock = DefaultClock;
    let task = seed_task(&harness, &project, &creator).await;
    harness
        .store
        .insert_comment(&Comment::new(
            task.id(),
            creator.id(),
            CommentBody::new("first pass", 2000).expect("valid body"),
            &clock,
        ))
        .await
        .expect("comment");
    let document = ProjectDocument::new(
        project.id(),
        FileName::new("brief.pdf").expect("valid name"),
        8,
        ContentDigest::of(b"%PDF-1.7"),
        creator.id(),
        &clock,
    );
    harness
        .store
        .insert_document(&document)
        .await
        .expect("document");

    let report = harness
        .store
        .delete_project(project.id())
        .await
        .expect("deletion should cascade");

    assert_eq!(report.tasks, 1);
    assert_eq!(report.comments, 1);
    assert_eq!(report.documents, 1);
    assert!(
        harness
            .store
            .find_task(task.id())
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(
        harness
            .store
            .find_document(document.id())
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn project_deletion_nulls_notification_correlations() {
    let harness = pg_harness();
    let (creator, _, project) = seed_project(&harness).await;
    let clock = DefaultClock;
    let task = seed_task(&harness, &project, &creator).await;
    let notification = Notification::new(
        creator.id(),
        NotificationKind::AwaitingValidation,
        "awaiting validation",
        &clock,
    )
    .with_project(project.id())
    .with_task(task.id());
    harness
        .store
        .insert_notification(&notification)
        .await
        .expect("notification");

    harness
        .store
        .delete_project(project.id())
        .await
        .expect("deletion");

    let kept = harness
        .store
        .find_notification(notification.id())
        .await
        .expect("lookup")
        .expect("the row survives the cascade");
    assert_eq!(kept.project_id(), None);
    assert_eq!(kept.task_id(), None);
    assert_eq!(kept.kind(), NotificationKind::AwaitingValidation);
}

#[tokio::test(flavor = "multi_thread")]
async fn team_deletion_is_restricted_by_the_projects_foreign_key() {
    let harness = pg_harness();
    let (_, team, _) = seed_project(&harness).await;

    // The directory adapter removes memberships first, then the team row;
    // the projects FK is declared RESTRICT, so the database refuses.
    let result = harness.directory.delete_team(team.id()).await;

    assert!(result.is_err(), "owned projects must block team deletion");
    assert!(
        harness
            .directory
            .find_team(team.id())
            .await
            .expect("lookup")
            .is_some(),
        "the refused deletion must roll back entirely",
    );
    assert!(
        harness
            .directory
            .find_membership(team.id(), {
                let managers = harness
                    .directory
                    .project_managers_of(team.id())
                    .await
                    .expect("managers");
                *managers.first().expect("seeded manager")
            })
            .await
            .expect("lookup")
            .is_some(),
        "membership cascade must roll back with it",
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn user_deletion_cascades_notifications_through_the_schema() {
    let harness = pg_harness();
    let clock = DefaultClock;
    let user = sample_user("leaving", Role::Developer);
    harness.directory.insert_user(&user).await.expect("user");
    harness
        .store
        .insert_notification(&Notification::new(
            user.id(),
            NotificationKind::Info,
            "welcome aboard",
            &clock,
        ))
        .await
        .expect("notification");

    let removed = harness
        .store
        .delete_notifications_for_user(user.id())
        .await
        .expect("notification cleanup");
    harness
        .directory
        .delete_user(user.id())
        .await
        .expect("user deletion");

    assert_eq!(removed, 1);
    assert!(
        harness
            .directory
            .find_user(user.id())
            .await
            .expect("lookup")
            .is_none()
    );
}
