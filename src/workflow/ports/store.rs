//! Store port for workflow persistence and atomic transition commits.

use crate::directory::domain::{TeamId, UserId};
use crate::workflow::domain::{
    Comment, DocumentId, Notification, NotificationId, Progress, Project, ProjectDocument,
    ProjectId, ProjectTask, TaskId, TaskStatus,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for workflow store operations.
pub type WorkflowStoreResult<T> = Result<T, WorkflowStoreError>;

/// One task transition with its side-effect rows, committed atomically.
///
/// The expected status/progress pair is the optimistic concurrency check:
/// implementations re-read the stored row inside the commit and fail with
/// [`WorkflowStoreError::StaleTransition`] when it no longer matches, so a
/// racing transition can never silently overwrite another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    /// Status the caller observed before applying the transition.
    pub expected_status: TaskStatus,
    /// Progress the caller observed before applying the transition.
    pub expected_progress: Progress,
    /// Task aggregate after the transition.
    pub task: ProjectTask,
    /// Comment persisted alongside the transition, if any.
    pub comment: Option<Comment>,
    /// Notifications persisted alongside the transition.
    pub notifications: Vec<Notification>,
}

/// Dependent rows removed by a project deletion cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Tasks removed.
    pub tasks: u64,
    /// Task comments removed.
    pub comments: u64,
    /// Document records removed.
    pub documents: u64,
}

/// Workflow persistence contract.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::DuplicateProject`] when the identifier
    /// collides.
    async fn insert_project(&self, project: &Project) -> WorkflowStoreResult<()>;

    /// Persists changes to an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::ProjectNotFound`] when the project does
    /// not exist.
    async fn update_project(&self, project: &Project) -> WorkflowStoreResult<()>;

    /// Finds a project by identifier. Returns `None` when absent.
    async fn find_project(&self, id: ProjectId) -> WorkflowStoreResult<Option<Project>>;

    /// Returns the projects owned by one team.
    async fn projects_for_team(&self, team_id: TeamId) -> WorkflowStoreResult<Vec<Project>>;

    /// Returns the number of projects owned by one team.
    async fn count_projects_for_team(&self, team_id: TeamId) -> WorkflowStoreResult<u64>;

    /// Returns the number of projects created by or managed by one user.
    async fn count_projects_referencing_user(&self, user_id: UserId)
    -> WorkflowStoreResult<u64>;

    /// Deletes a project, cascading its tasks, their comments, and its
    /// document records. Correlated notifications lose their project/task
    /// references but survive.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::ProjectNotFound`] when the project does
    /// not exist.
    async fn delete_project(&self, id: ProjectId) -> WorkflowStoreResult<CascadeReport>;

    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::DuplicateTask`] when the identifier
    /// collides, or [`WorkflowStoreError::ProjectNotFound`] when the parent
    /// project is absent.
    async fn insert_task(&self, task: &ProjectTask) -> WorkflowStoreResult<()>;

    /// Finds a task by identifier. Returns `None` when absent.
    async fn find_task(&self, id: TaskId) -> WorkflowStoreResult<Option<ProjectTask>>;

    /// Returns the tasks of one project.
    async fn tasks_for_project(&self, project_id: ProjectId)
    -> WorkflowStoreResult<Vec<ProjectTask>>;

    /// Returns the number of tasks assigned to or created by one user.
    async fn count_tasks_referencing_user(&self, user_id: UserId) -> WorkflowStoreResult<u64>;

    /// Commits one transition: the task mutation, its optional comment, and
    /// its notifications persist together or not at all.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::TaskNotFound`] when the task row is
    /// absent, or [`WorkflowStoreError::StaleTransition`] when the stored
    /// status/progress pair no longer matches the record's expectation.
    async fn commit_transition(&self, record: TransitionRecord) -> WorkflowStoreResult<()>;

    /// Stores a standalone comment outside any transition.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::TaskNotFound`] when the task is absent.
    async fn insert_comment(&self, comment: &Comment) -> WorkflowStoreResult<()>;

    /// Returns the comments of one task, oldest first.
    async fn comments_for_task(&self, task_id: TaskId) -> WorkflowStoreResult<Vec<Comment>>;

    /// Stores a standalone notification outside any transition.
    async fn insert_notification(&self, notification: &Notification) -> WorkflowStoreResult<()>;

    /// Finds a notification by identifier. Returns `None` when absent.
    async fn find_notification(
        &self,
        id: NotificationId,
    ) -> WorkflowStoreResult<Option<Notification>>;

    /// Persists changes to an existing notification.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::NotificationNotFound`] when the row is
    /// absent.
    async fn update_notification(&self, notification: &Notification)
    -> WorkflowStoreResult<()>;

    /// Returns the notifications addressed to one user, newest first.
    async fn notifications_for(&self, user_id: UserId)
    -> WorkflowStoreResult<Vec<Notification>>;

    /// Returns the number of unread notifications addressed to one user.
    async fn unread_count(&self, user_id: UserId) -> WorkflowStoreResult<u64>;

    /// Deletes one notification owned by the given recipient.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::NotificationNotFound`] when no row with
    /// the identifier is addressed to the recipient.
    async fn delete_notification(
        &self,
        id: NotificationId,
        recipient: UserId,
    ) -> WorkflowStoreResult<()>;

    /// Deletes every notification addressed to one user, returning the
    /// number removed.
    async fn delete_notifications_for_user(&self, user_id: UserId) -> WorkflowStoreResult<u64>;

    /// Stores a new document record.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::ProjectNotFound`] when the project is
    /// absent.
    async fn insert_document(&self, document: &ProjectDocument) -> WorkflowStoreResult<()>;

    /// Finds a document record by identifier. Returns `None` when absent.
    async fn find_document(
        &self,
        id: DocumentId,
    ) -> WorkflowStoreResult<Option<ProjectDocument>>;

    /// Returns the document records of one project.
    async fn documents_for_project(
        &self,
        project_id: ProjectId,
    ) -> WorkflowStoreResult<Vec<ProjectDocument>>;
}

/// Errors returned by workflow store implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowStoreError {
    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The notification was not found for the recipient.
    #[error("notification not found: {0}")]
    NotificationNotFound(NotificationId),

    /// The document record was not found.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// A concurrent transition changed the task first.
    #[error("stale transition for task {task_id}: stored state no longer matches")]
    StaleTransition {
        /// Task whose commit lost the race.
        task_id: TaskId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for WorkflowStoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
