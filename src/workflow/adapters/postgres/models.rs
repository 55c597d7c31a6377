//! Diesel row models for workflow persistence.

use super::schema::{notifications, project_documents, project_tasks, projects, task_comments};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query and insert model for project rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Internal project identifier.
    pub id: uuid::Uuid,
    /// Project display name.
    pub project_name: String,
    /// First day of the schedule.
    pub starts_on: NaiveDate,
    /// Last day of the schedule.
    pub ends_on: NaiveDate,
    /// Lifecycle status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Owning team.
    pub team_id: uuid::Uuid,
    /// Creator.
    pub created_by: uuid::Uuid,
    /// Assigned project manager, if any.
    pub manager_id: Option<uuid::Uuid>,
    /// Cancellation timestamp, if cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert model for task rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = project_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Parent project.
    pub project_id: uuid::Uuid,
    /// Task display name.
    pub task_name: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Progress percentage.
    pub progress: i16,
    /// Lifecycle status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Assignee, if any.
    pub assigned_to: Option<uuid::Uuid>,
    /// Creator.
    pub created_by: uuid::Uuid,
    /// Validator, if validated.
    pub validated_by: Option<uuid::Uuid>,
    /// Validation timestamp, if validated.
    pub validated_at: Option<DateTime<Utc>>,
    /// Latest rejection timestamp, if ever rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Progress snapshot taken at submission, if submitted.
    pub progress_before_submission: Option<i16>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert model for comment rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskCommentRow {
    /// Internal comment identifier.
    pub id: uuid::Uuid,
    /// Task the comment is attached to.
    pub task_id: uuid::Uuid,
    /// Author.
    pub author_id: uuid::Uuid,
    /// Comment body.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert model for notification rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Internal notification identifier.
    pub id: uuid::Uuid,
    /// Recipient.
    pub recipient_id: uuid::Uuid,
    /// Notification kind.
    pub kind: String,
    /// Rendered body.
    pub body: String,
    /// Correlated project, if any.
    pub project_id: Option<uuid::Uuid>,
    /// Correlated task, if any.
    pub task_id: Option<uuid::Uuid>,
    /// Acting user, if recorded.
    pub actor_id: Option<uuid::Uuid>,
    /// Read timestamp, if read.
    pub read_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query and insert model for document rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectDocumentRow {
    /// Internal document identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Uploaded-file name.
    pub file_name: String,
    /// Uploaded size in bytes.
    pub size_bytes: i64,
    /// Lowercase hex SHA-256 digest of the content.
    pub content_digest: String,
    /// Uploader.
    pub uploaded_by: uuid::Uuid,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}
