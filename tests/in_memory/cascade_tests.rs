//! Cascade and restrict deletion flows over the in-memory adapters.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use super::helpers::TestContext;
use chantier::directory::domain::Role;
use chantier::directory::ports::DirectoryRepository;
use chantier::workflow::domain::EntityKind;
use chantier::workflow::ports::WorkflowStore;
use chantier::workflow::services::{DeletionError, RegisterDocumentRequest};

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_removes_its_task_and_document() {
    let ctx = TestContext::new();
    let (team, developer, _, _, manager_caps) = ctx.seeded_team().await;
    let (_, roster_caps) = ctx.user_with_capabilities("boss", Role::Manager).await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    let document = ctx
        .projects
        .register_document(
            RegisterDocumentRequest::new(project.id(), "brief.pdf", b"%PDF-1.7".to_vec()),
            &manager_caps,
        )
        .await
        .expect("document registration");

    let report = ctx
        .deletion
        .delete_project(project.id(), &roster_caps)
        .await
        .expect("deletion should cascade");

    assert_eq!(report.tasks, 1);
    assert_eq!(report.documents, 1);
    assert!(
        ctx.store
            .find_task(task.id())
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(
        ctx.store
            .find_document(document.id())
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(
        ctx.store
            .find_project(project.id())
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_cascades_through_tasks_to_comments() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.engine
        .comment_on_task(
            chantier::workflow::services::CommentOnTaskRequest::new(task.id(), "first pass done"),
            &developer_caps,
        )
        .await
        .expect("comment");

    let report = ctx
        .deletion
        .delete_project(project.id(), &manager_caps)
        .await
        .expect("deletion should cascade");

    assert_eq!(report.comments, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn project_deletion_nulls_notification_correlations_but_keeps_the_rows() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.submit_task(&task, &developer_caps).await;

    ctx.deletion
        .delete_project(project.id(), &manager_caps)
        .await
        .expect("deletion");

    let kept = ctx
        .store
        .notifications_for(developer.id())
        .await
        .expect("lookup");
    assert!(!kept.is_empty(), "notifications survive the cascade");
    for notification in kept {
        assert_eq!(notification.project_id(), None);
        assert_eq!(notification.task_id(), None);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_team_is_blocked_while_it_owns_a_project() {
    let ctx = TestContext::new();
    let (team, _, _, _, manager_caps) = ctx.seeded_team().await;
    let (_, roster_caps) = ctx.user_with_capabilities("boss", Role::Manager).await;
    ctx.seeded_project(&team, &manager_caps).await;

    let result = ctx.deletion.delete_team(team.id(), &roster_caps).await;

    let Err(DeletionError::Blocked(blocked)) = result else {
        panic!("expected a blocked deletion, got {result:?}");
    };
    assert_eq!(blocked.owner, EntityKind::Team);
    assert_eq!(blocked.dependent, EntityKind::Project);
    assert_eq!(blocked.count, 1);
    assert!(
        ctx.directory
            .find_team(team.id())
            .await
            .expect("lookup")
            .is_some()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_team_without_projects_cascades_its_memberships() {
    let ctx = TestContext::new();
    let (team, developer, _, manager, _) = ctx.seeded_team().await;
    let (_, roster_caps) = ctx.user_with_capabilities("boss", Role::Manager).await;

    let cascaded = ctx
        .deletion
        .delete_team(team.id(), &roster_caps)
        .await
        .expect("deletion should cascade memberships");

    assert_eq!(cascaded, 2);
    assert!(
        ctx.directory
            .find_membership(team.id(), developer.id())
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(
        ctx.directory
            .find_membership(team.id(), manager.id())
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_user_is_blocked_while_tasks_reference_them() {
    let ctx = TestContext::new();
    let (team, developer, _, _, manager_caps) = ctx.seeded_team().await;
    let (_, roster_caps) = ctx.user_with_capabilities("boss", Role::Manager).await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    ctx.seeded_task(&project, &manager_caps, &developer).await;

    let result = ctx.deletion.delete_user(developer.id(), &roster_caps).await;

    let Err(DeletionError::Blocked(blocked)) = result else {
        panic!("expected a blocked deletion, got {result:?}");
    };
    assert_eq!(blocked.dependent, EntityKind::ProjectTask);
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_an_unreferenced_user_cascades_notifications_and_memberships() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let (_, roster_caps) = ctx.user_with_capabilities("boss", Role::Manager).await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.submit_task(&task, &developer_caps).await;

    // Remove the referencing rows first, then the user may go.
    ctx.deletion
        .delete_project(project.id(), &roster_caps)
        .await
        .expect("project deletion");
    let removed = ctx
        .deletion
        .delete_user(developer.id(), &roster_caps)
        .await
        .expect("user deletion should cascade");

    assert!(removed >= 2, "assigned notification + membership at least");
    assert!(
        ctx.directory
            .find_user(developer.id())
            .await
            .expect("lookup")
            .is_none()
    );
    assert_eq!(
        ctx.store
            .unread_count(developer.id())
            .await
            .expect("unread count"),
        0
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn team_and_user_deletion_require_roster_authority() {
    let ctx = TestContext::new();
    let (team, developer, _, _, manager_caps) = ctx.seeded_team().await;

    let team_result = ctx.deletion.delete_team(team.id(), &manager_caps).await;
    assert!(matches!(
        team_result,
        Err(DeletionError::Forbidden { .. })
    ));

    let user_result = ctx.deletion.delete_user(developer.id(), &manager_caps).await;
    assert!(matches!(
        user_result,
        Err(DeletionError::Forbidden { .. })
    ));
}
