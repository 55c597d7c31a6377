//! Notification read/unread flows and recipient scoping.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use super::helpers::TestContext;
use chantier::workflow::services::WorkflowError;

#[tokio::test(flavor = "multi_thread")]
async fn unread_count_tracks_read_stamps() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.submit_task(&task, &developer_caps).await;
    ctx.engine
        .reject_task(
            chantier::workflow::services::RejectTaskRequest::new(task.id(), "polish the output"),
            &manager_caps,
        )
        .await
        .expect("rejection");

    // assigned + rejected.
    assert_eq!(
        ctx.engine
            .unread_count(developer.id())
            .await
            .expect("count"),
        2
    );

    let notifications = ctx
        .engine
        .notifications_for(developer.id())
        .await
        .expect("lookup");
    let first = notifications.first().expect("newest notification");
    let marked = ctx
        .engine
        .mark_notification_read(first.id(), &developer_caps)
        .await
        .expect("read stamp");
    assert!(marked.read_at().is_some());

    assert_eq!(
        ctx.engine
            .unread_count(developer.id())
            .await
            .expect("count"),
        1
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn notifications_are_listed_newest_first() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.submit_task(&task, &developer_caps).await;
    ctx.engine
        .reject_task(
            chantier::workflow::services::RejectTaskRequest::new(task.id(), "one more pass"),
            &manager_caps,
        )
        .await
        .expect("rejection");

    let notifications = ctx
        .engine
        .notifications_for(developer.id())
        .await
        .expect("lookup");
    for pair in notifications.windows(2) {
        let [newer, older] = pair else {
            panic!("windows(2) always yields pairs");
        };
        assert!(newer.created_at() >= older.created_at());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn recipients_cannot_touch_each_others_notifications() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    let task = ctx.seeded_task(&project, &manager_caps, &developer).await;
    ctx.submit_task(&task, &developer_caps).await;

    let manager_notifications = ctx
        .engine
        .notifications_for(manager_caps.user_id())
        .await
        .expect("lookup");
    let foreign = manager_notifications.first().expect("manager notification");

    let read_result = ctx
        .engine
        .mark_notification_read(foreign.id(), &developer_caps)
        .await;
    assert!(matches!(
        read_result,
        Err(WorkflowError::NotificationNotFound(_))
    ));

    let delete_result = ctx
        .engine
        .delete_notification(foreign.id(), &developer_caps)
        .await;
    assert!(matches!(
        delete_result,
        Err(WorkflowError::NotificationNotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn recipients_may_delete_their_own_notifications() {
    let ctx = TestContext::new();
    let (team, developer, developer_caps, _, manager_caps) = ctx.seeded_team().await;
    let project = ctx.seeded_project(&team, &manager_caps).await;
    ctx.seeded_task(&project, &manager_caps, &developer).await;

    let notifications = ctx
        .engine
        .notifications_for(developer.id())
        .await
        .expect("lookup");
    let own = notifications.first().expect("assigned notification");

    ctx.engine
        .delete_notification(own.id(), &developer_caps)
        .await
        .expect("own deletion should succeed");

    assert_eq!(
        ctx.engine
            .unread_count(developer.id())
            .await
            .expect("count"),
        0
    );
}
