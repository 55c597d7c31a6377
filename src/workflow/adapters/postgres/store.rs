//! `PostgreSQL` store implementation for workflow persistence.
//!
//! Transition commits run inside a single database transaction with a
//! guarded `UPDATE`: the row must still carry the status/progress pair the
//! caller observed, otherwise the commit fails as stale and nothing
//! persists. Project deletion relies on the foreign-key cascade and
//! set-null rules declared in the migrations.

use super::{
    models::{
        NotificationRow, ProjectDocumentRow, ProjectRow, ProjectTaskRow, TaskCommentRow,
    },
    schema::{notifications, project_documents, project_tasks, projects, task_comments},
};
use crate::directory::domain::{TeamId, UserId};
use crate::workflow::domain::{
    Comment, CommentBody, CommentId, ContentDigest, DocumentId, FileName, Notification,
    NotificationId, NotificationKind, PersistedProjectData, PersistedTaskData, Priority,
    Progress, Project, ProjectDocument, ProjectId, ProjectName, ProjectSchedule, ProjectStatus,
    ProjectTask, TaskId, TaskName, TaskStatus,
};
use crate::workflow::ports::{
    CascadeReport, TransitionRecord, WorkflowStore, WorkflowStoreError, WorkflowStoreResult,
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by workflow adapters.
pub type WorkflowPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed workflow store.
#[derive(Debug, Clone)]
pub struct PostgresWorkflowStore {
    pool: WorkflowPgPool,
}

impl PostgresWorkflowStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: WorkflowPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> WorkflowStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> WorkflowStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(WorkflowStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(WorkflowStoreError::persistence)?
    }
}

#[async_trait]
impl WorkflowStore for PostgresWorkflowStore {
    async fn insert_project(&self, project: &Project) -> WorkflowStoreResult<()> {
        let row = project_to_row(project);
        let project_id = project.id();
        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        WorkflowStoreError::DuplicateProject(project_id)
                    }
                    _ => WorkflowStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_project(&self, project: &Project) -> WorkflowStoreResult<()> {
        let row = project_to_row(project);
        let project_id = project.id();
        self.run_blocking(move |connection| {
            let updated =
                diesel::update(projects::table.filter(projects::id.eq(project_id.into_inner())))
                    .set(&row)
                    .execute(connection)
                    .map_err(WorkflowStoreError::persistence)?;
            if updated == 0 {
                return Err(WorkflowStoreError::ProjectNotFound(project_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_project(&self, id: ProjectId) -> WorkflowStoreResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(WorkflowStoreError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn projects_for_team(&self, team_id: TeamId) -> WorkflowStoreResult<Vec<Project>> {
        self.run_blocking(move |connection| {
            let rows = projects::table
                .filter(projects::team_id.eq(team_id.into_inner()))
                .order(projects::created_at.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(WorkflowStoreError::persistence)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }

    async fn count_projects_for_team(&self, team_id: TeamId) -> WorkflowStoreResult<u64> {
        self.run_blocking(move |connection| {
            let count: i64 = projects::table
                .filter(projects::team_id.eq(team_id.into_inner()))
                .count()
                .get_result(connection)
                .map_err(WorkflowStoreError::persistence)?;
            u64::try_from(count).map_err(WorkflowStoreError::persistence)
        })
        .await
    }

    async fn count_projects_referencing_user(
        &self,
        user_id: UserId,
    ) -> WorkflowStoreResult<u64> {
        self.run_blocking(move |connection| {
            let raw = user_id.into_inner();
            let count: i64 = projects::table
                .filter(
                    projects::created_by
                        .eq(raw)
                        .or(projects::manager_id.eq(raw)),
                )
                .count()
                .get_result(connection)
                .map_err(WorkflowStoreError::persistence)?;
            u64::try_from(count).map_err(WorkflowStoreError::persistence)
        })
        .await
    }

    async fn delete_project(&self, id: ProjectId) -> WorkflowStoreResult<CascadeReport> {
        self.run_blocking(move |connection| {
            connection.transaction(|tx| {
                let raw = id.into_inner();
                let task_ids: Vec<uuid::Uuid> = project_tasks::table
                    .filter(project_tasks::project_id.eq(raw))
                    .select(project_tasks::id)
                    .load(tx)
                    .map_err(WorkflowStoreError::persistence)?;
                let comments: i64 = task_comments::table
                    .filter(task_comments::task_id.eq_any(&task_ids))
                    .count()
                    .get_result(tx)
                    .map_err(WorkflowStoreError::persistence)?;
                let documents: i64 = project_documents::table
                    .filter(project_documents::project_id.eq(raw))
                    .count()
                    .get_result(tx)
                    .map_err(WorkflowStoreError::persistence)?;

                // FK rules do the rest: tasks, comments, and documents
                // cascade; notification correlations are set to null.
                let deleted = diesel::delete(projects::table.filter(projects::id.eq(raw)))
                    .execute(tx)
                    .map_err(WorkflowStoreError::persistence)?;
                if deleted == 0 {
                    return Err(WorkflowStoreError::ProjectNotFound(id));
                }

                Ok(CascadeReport {
                    tasks: u64::try_from(task_ids.len())
                        .map_err(WorkflowStoreError::persistence)?,
                    comments: u64::try_from(comments)
                        .map_err(WorkflowStoreError::persistence)?,
                    documents: u64::try_from(documents)
                        .map_err(WorkflowStoreError::persistence)?,
                })
            })
        })
        .await
    }

    async fn insert_task(&self, task: &ProjectTask) -> WorkflowStoreResult<()> {
        let row = task_to_row(task);
        let task_id = task.id();
        let project_id = task.project_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(project_tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        WorkflowStoreError::DuplicateTask(task_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        WorkflowStoreError::ProjectNotFound(project_id)
                    }
                    _ => WorkflowStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> WorkflowStoreResult<Option<ProjectTask>> {
        self.run_blocking(move |connection| {
            let row = project_tasks::table
                .filter(project_tasks::id.eq(id.into_inner()))
                .select(ProjectTaskRow::as_select())
                .first::<ProjectTaskRow>(connection)
                .optional()
                .map_err(WorkflowStoreError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn tasks_for_project(
        &self,
        project_id: ProjectId,
    ) -> WorkflowStoreResult<Vec<ProjectTask>> {
        self.run_blocking(move |connection| {
            let rows = project_tasks::table
                .filter(project_tasks::project_id.eq(project_id.into_inner()))
                .order(project_tasks::created_at.asc())
                .select(ProjectTaskRow::as_select())
                .load::<ProjectTaskRow>(connection)
                .map_err(WorkflowStoreError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn count_tasks_referencing_user(&self, user_id: UserId) -> WorkflowStoreResult<u64> {
        self.run_blocking(move |connection| {
            let raw = user_id.into_inner();
            let count: i64 = project_tasks::table
                .filter(
                    project_tasks::assigned_to
                        .eq(raw)
                        .or(project_tasks::created_by.eq(raw)),
                )
                .count()
                .get_result(connection)
                .map_err(WorkflowStoreError::persistence)?;
            u64::try_from(count).map_err(WorkflowStoreError::persistence)
        })
        .await
    }

    async fn commit_transition(&self, record: TransitionRecord) -> WorkflowStoreResult<()> {
        let task_id = record.task.id();
        let expected_status = record.expected_status.as_str();
        let expected_progress = record.expected_progress.as_i16();
        let task_row = task_to_row(&record.task);
        let comment_row = record.comment.as_ref().map(comment_to_row);
        let notification_rows: Vec<NotificationRow> =
            record.notifications.iter().map(notification_to_row).collect();

        self.run_blocking(move |connection| {
            connection.transaction(|tx| {
                let updated = diesel::update(
                    project_tasks::table
                        .filter(project_tasks::id.eq(task_id.into_inner()))
                        .filter(project_tasks::status.eq(expected_status))
                        .filter(project_tasks::progress.eq(expected_progress)),
                )
                .set(&task_row)
                .execute(tx)
                .map_err(WorkflowStoreError::persistence)?;
                if updated == 0 {
                    let exists: i64 = project_tasks::table
                        .filter(project_tasks::id.eq(task_id.into_inner()))
                        .count()
                        .get_result(tx)
                        .map_err(WorkflowStoreError::persistence)?;
                    if exists == 0 {
                        return Err(WorkflowStoreError::TaskNotFound(task_id));
                    }
                    return Err(WorkflowStoreError::StaleTransition { task_id });
                }

                if let Some(row) = comment_row {
                    diesel::insert_into(task_comments::table)
                        .values(&row)
                        .execute(tx)
                        .map_err(WorkflowStoreError::persistence)?;
                }
                if !notification_rows.is_empty() {
                    diesel::insert_into(notifications::table)
                        .values(&notification_rows)
                        .execute(tx)
                        .map_err(WorkflowStoreError::persistence)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn insert_comment(&self, comment: &Comment) -> WorkflowStoreResult<()> {
        let row = comment_to_row(comment);
        let task_id = comment.task_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(task_comments::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        WorkflowStoreError::TaskNotFound(task_id)
                    }
                    _ => WorkflowStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn comments_for_task(&self, task_id: TaskId) -> WorkflowStoreResult<Vec<Comment>> {
        self.run_blocking(move |connection| {
            let rows = task_comments::table
                .filter(task_comments::task_id.eq(task_id.into_inner()))
                .order(task_comments::created_at.asc())
                .select(TaskCommentRow::as_select())
                .load::<TaskCommentRow>(connection)
                .map_err(WorkflowStoreError::persistence)?;
            rows.into_iter().map(row_to_comment).collect()
        })
        .await
    }

    async fn insert_notification(&self, notification: &Notification) -> WorkflowStoreResult<()> {
        let row = notification_to_row(notification);
        self.run_blocking(move |connection| {
            diesel::insert_into(notifications::table)
                .values(&row)
                .execute(connection)
                .map_err(WorkflowStoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_notification(
        &self,
        id: NotificationId,
    ) -> WorkflowStoreResult<Option<Notification>> {
        self.run_blocking(move |connection| {
            let row = notifications::table
                .filter(notifications::id.eq(id.into_inner()))
                .select(NotificationRow::as_select())
                .first::<NotificationRow>(connection)
                .optional()
                .map_err(WorkflowStoreError::persistence)?;
            row.map(row_to_notification).transpose()
        })
        .await
    }

    async fn update_notification(
        &self,
        notification: &Notification,
    ) -> WorkflowStoreResult<()> {
        let row = notification_to_row(notification);
        let id = notification.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                notifications::table.filter(notifications::id.eq(id.into_inner())),
            )
            .set(&row)
            .execute(connection)
            .map_err(WorkflowStoreError::persistence)?;
            if updated == 0 {
                return Err(WorkflowStoreError::NotificationNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn notifications_for(
        &self,
        user_id: UserId,
    ) -> WorkflowStoreResult<Vec<Notification>> {
        self.run_blocking(move |connection| {
            let rows = notifications::table
                .filter(notifications::recipient_id.eq(user_id.into_inner()))
                .order(notifications::created_at.desc())
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(WorkflowStoreError::persistence)?;
            rows.into_iter().map(row_to_notification).collect()
        })
        .await
    }

    async fn unread_count(&self, user_id: UserId) -> WorkflowStoreResult<u64> {
        self.run_blocking(move |connection| {
            let count: i64 = notifications::table
                .filter(notifications::recipient_id.eq(user_id.into_inner()))
                .filter(notifications::read_at.is_null())
                .count()
                .get_result(connection)
                .map_err(WorkflowStoreError::persistence)?;
            u64::try_from(count).map_err(WorkflowStoreError::persistence)
        })
        .await
    }

    async fn delete_notification(
        &self,
        id: NotificationId,
        recipient: UserId,
    ) -> WorkflowStoreResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                notifications::table
                    .filter(notifications::id.eq(id.into_inner()))
                    .filter(notifications::recipient_id.eq(recipient.into_inner())),
            )
            .execute(connection)
            .map_err(WorkflowStoreError::persistence)?;
            if deleted == 0 {
                return Err(WorkflowStoreError::NotificationNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_notifications_for_user(&self, user_id: UserId) -> WorkflowStoreResult<u64> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                notifications::table
                    .filter(notifications::recipient_id.eq(user_id.into_inner())),
            )
            .execute(connection)
            .map_err(WorkflowStoreError::persistence)?;
            u64::try_from(deleted).map_err(WorkflowStoreError::persistence)
        })
        .await
    }

    async fn insert_document(&self, document: &ProjectDocument) -> WorkflowStoreResult<()> {
        let row = document_to_row(document)?;
        let project_id = document.project_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(project_documents::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        WorkflowStoreError::ProjectNotFound(project_id)
                    }
                    _ => WorkflowStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_document(
        &self,
        id: DocumentId,
    ) -> WorkflowStoreResult<Option<ProjectDocument>> {
        self.run_blocking(move |connection| {
            let row = project_documents::table
                .filter(project_documents::id.eq(id.into_inner()))
                .select(ProjectDocumentRow::as_select())
                .first::<ProjectDocumentRow>(connection)
                .optional()
                .map_err(WorkflowStoreError::persistence)?;
            row.map(row_to_document).transpose()
        })
        .await
    }

    async fn documents_for_project(
        &self,
        project_id: ProjectId,
    ) -> WorkflowStoreResult<Vec<ProjectDocument>> {
        self.run_blocking(move |connection| {
            let rows = project_documents::table
                .filter(project_documents::project_id.eq(project_id.into_inner()))
                .order(project_documents::created_at.asc())
                .select(ProjectDocumentRow::as_select())
                .load::<ProjectDocumentRow>(connection)
                .map_err(WorkflowStoreError::persistence)?;
            rows.into_iter().map(row_to_document).collect()
        })
        .await
    }
}

fn project_to_row(project: &Project) -> ProjectRow {
    ProjectRow {
        id: project.id().into_inner(),
        project_name: project.name().as_str().to_owned(),
        starts_on: project.schedule().starts_on(),
        ends_on: project.schedule().ends_on(),
        status: project.status().as_str().to_owned(),
        priority: project.priority().as_str().to_owned(),
        team_id: project.team_id().into_inner(),
        created_by: project.created_by().into_inner(),
        manager_id: project.manager().map(UserId::into_inner),
        cancelled_at: project.cancelled_at(),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

fn row_to_project(row: ProjectRow) -> WorkflowStoreResult<Project> {
    let name = ProjectName::new(row.project_name).map_err(WorkflowStoreError::persistence)?;
    let schedule = ProjectSchedule::new(row.starts_on, row.ends_on)
        .map_err(WorkflowStoreError::persistence)?;
    let status = ProjectStatus::try_from(row.status.as_str())
        .map_err(WorkflowStoreError::persistence)?;
    let priority =
        Priority::try_from(row.priority.as_str()).map_err(WorkflowStoreError::persistence)?;
    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(row.id),
        name,
        schedule,
        status,
        priority,
        team_id: TeamId::from_uuid(row.team_id),
        created_by: UserId::from_uuid(row.created_by),
        manager: row.manager_id.map(UserId::from_uuid),
        cancelled_at: row.cancelled_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn task_to_row(task: &ProjectTask) -> ProjectTaskRow {
    ProjectTaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().into_inner(),
        task_name: task.name().as_str().to_owned(),
        due_date: task.due_date(),
        progress: task.progress().as_i16(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        assigned_to: task.assigned_to().map(UserId::into_inner),
        created_by: task.created_by().into_inner(),
        validated_by: task.validated_by().map(UserId::into_inner),
        validated_at: task.validated_at(),
        rejected_at: task.rejected_at(),
        progress_before_submission: task.progress_before_submission().map(Progress::as_i16),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: ProjectTaskRow) -> WorkflowStoreResult<ProjectTask> {
    let name = TaskName::new(row.task_name).map_err(WorkflowStoreError::persistence)?;
    let progress =
        Progress::from_persisted(row.progress).map_err(WorkflowStoreError::persistence)?;
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(WorkflowStoreError::persistence)?;
    let priority =
        Priority::try_from(row.priority.as_str()).map_err(WorkflowStoreError::persistence)?;
    let progress_before_submission = row
        .progress_before_submission
        .map(Progress::from_persisted)
        .transpose()
        .map_err(WorkflowStoreError::persistence)?;
    Ok(ProjectTask::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        name,
        due_date: row.due_date,
        progress,
        status,
        priority,
        assigned_to: row.assigned_to.map(UserId::from_uuid),
        created_by: UserId::from_uuid(row.created_by),
        validated_by: row.validated_by.map(UserId::from_uuid),
        validated_at: row.validated_at,
        rejected_at: row.rejected_at,
        progress_before_submission,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn comment_to_row(comment: &Comment) -> TaskCommentRow {
    TaskCommentRow {
        id: comment.id().into_inner(),
        task_id: comment.task_id().into_inner(),
        author_id: comment.author().into_inner(),
        body: comment.body().as_str().to_owned(),
        created_at: comment.created_at(),
        updated_at: comment.updated_at(),
    }
}

fn row_to_comment(row: TaskCommentRow) -> WorkflowStoreResult<Comment> {
    let body =
        CommentBody::new(row.body, usize::MAX).map_err(WorkflowStoreError::persistence)?;
    Ok(Comment::from_persisted(
        CommentId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        UserId::from_uuid(row.author_id),
        body,
        row.created_at,
        row.updated_at,
    ))
}

fn notification_to_row(notification: &Notification) -> NotificationRow {
    NotificationRow {
        id: notification.id().into_inner(),
        recipient_id: notification.recipient().into_inner(),
        kind: notification.kind().as_str().to_owned(),
        body: notification.body().to_owned(),
        project_id: notification.project_id().map(ProjectId::into_inner),
        task_id: notification.task_id().map(TaskId::into_inner),
        actor_id: notification.actor().map(UserId::into_inner),
        read_at: notification.read_at(),
        created_at: notification.created_at(),
    }
}

fn row_to_notification(row: NotificationRow) -> WorkflowStoreResult<Notification> {
    let kind = NotificationKind::try_from(row.kind.as_str())
        .map_err(WorkflowStoreError::persistence)?;
    Ok(Notification::from_persisted(
        NotificationId::from_uuid(row.id),
        UserId::from_uuid(row.recipient_id),
        kind,
        row.body,
        row.project_id.map(ProjectId::from_uuid),
        row.task_id.map(TaskId::from_uuid),
        row.actor_id.map(UserId::from_uuid),
        row.read_at,
        row.created_at,
    ))
}

fn document_to_row(document: &ProjectDocument) -> WorkflowStoreResult<ProjectDocumentRow> {
    Ok(ProjectDocumentRow {
        id: document.id().into_inner(),
        project_id: document.project_id().into_inner(),
        file_name: document.file_name().as_str().to_owned(),
        size_bytes: i64::try_from(document.size_bytes())
            .map_err(WorkflowStoreError::persistence)?,
        content_digest: document.digest().as_str().to_owned(),
        uploaded_by: document.uploaded_by().into_inner(),
        created_at: document.created_at(),
    })
}

fn row_to_document(row: ProjectDocumentRow) -> WorkflowStoreResult<ProjectDocument> {
    let file_name = FileName::new(row.file_name).map_err(WorkflowStoreError::persistence)?;
    let size_bytes =
        u64::try_from(row.size_bytes).map_err(WorkflowStoreError::persistence)?;
    Ok(ProjectDocument::from_persisted(
        DocumentId::from_uuid(row.id),
        ProjectId::from_uuid(row.project_id),
        file_name,
        size_bytes,
        ContentDigest::from_persisted(row.content_digest),
        UserId::from_uuid(row.uploaded_by),
        row.created_at,
    ))
}
