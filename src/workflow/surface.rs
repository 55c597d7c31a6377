//! Transport-agnostic payload shapes for the workflow engine.
//!
//! HTTP wiring lives outside this crate; these types define the error
//! taxonomy and the task representation an endpoint layer serializes, so
//! every transport reports failures the same way.

use crate::directory::domain::UserId;
use crate::workflow::domain::{ProjectTask, WorkflowDomainError};
use crate::workflow::services::WorkflowError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Failure taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Role or ownership violation.
    Forbidden,
    /// Transition not legal from the current state.
    InvalidState,
    /// Malformed input.
    ValidationError,
    /// Unknown task, project, user, or notification.
    NotFound,
    /// A concurrent transition won the race.
    Conflict,
    /// Persistence or rendering failure.
    StorageError,
}

impl ErrorKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forbidden => "forbidden",
            Self::InvalidState => "invalid_state",
            Self::ValidationError => "validation_error",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::StorageError => "storage_error",
        }
    }

    /// Returns the HTTP status an endpoint layer should answer with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Forbidden => 403,
            Self::InvalidState | Self::Conflict => 409,
            Self::ValidationError => 422,
            Self::NotFound => 404,
            Self::StorageError => 500,
        }
    }
}

const fn domain_error_kind(err: &WorkflowDomainError) -> ErrorKind {
    match err {
        WorkflowDomainError::ProgressOutOfRange(_)
        | WorkflowDomainError::EmptyRejectionReason
        | WorkflowDomainError::RejectionReasonTooLong { .. }
        | WorkflowDomainError::EmptyCommentBody
        | WorkflowDomainError::CommentTooLong { .. }
        | WorkflowDomainError::InvalidProjectName(_)
        | WorkflowDomainError::InvalidTaskName(_)
        | WorkflowDomainError::InvalidFileName(_)
        | WorkflowDomainError::ScheduleEndsBeforeStart { .. } => ErrorKind::ValidationError,
        WorkflowDomainError::InvalidStateTransition { .. }
        | WorkflowDomainError::TaskLocked { .. }
        | WorkflowDomainError::ProgressStatusMismatch { .. }
        | WorkflowDomainError::StatusNotRequestable { .. }
        | WorkflowDomainError::ProjectAlreadyCancelled => ErrorKind::InvalidState,
    }
}

impl WorkflowError {
    /// Classifies the error into the surfaced taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(domain) => domain_error_kind(domain),
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::TaskNotFound(_)
            | Self::ProjectNotFound(_)
            | Self::NotificationNotFound(_)
            | Self::UnknownUser(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Directory(directory) => directory_error_kind(directory),
            Self::Compose(_) | Self::Store(_) => ErrorKind::StorageError,
        }
    }
}

fn directory_error_kind(err: &crate::directory::ports::DirectoryRepositoryError) -> ErrorKind {
    use crate::directory::ports::DirectoryRepositoryError as Repo;
    match err {
        Repo::DuplicateUser(_)
        | Repo::DuplicateUserName(_)
        | Repo::DuplicateEmail(_)
        | Repo::DuplicateTeam(_)
        | Repo::DuplicateMembership { .. } => ErrorKind::Conflict,
        Repo::UserNotFound(_)
        | Repo::TeamNotFound(_)
        | Repo::MembershipNotFound { .. }
        | Repo::ResetTokenNotFound(_) => ErrorKind::NotFound,
        Repo::Persistence(_) => ErrorKind::StorageError,
    }
}

/// Structured failure payload answered on every refused operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePayload {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable failure kind.
    pub error_kind: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&WorkflowError> for FailurePayload {
    fn from(err: &WorkflowError) -> Self {
        Self {
            success: false,
            error_kind: err.kind().as_str().to_owned(),
            message: err.to_string(),
        }
    }
}

/// Serializable task representation answered on every successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRepresentation {
    /// Task identifier.
    pub id: Uuid,
    /// Parent project identifier.
    pub project_id: Uuid,
    /// Task name.
    pub name: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Progress percentage.
    pub progress: u8,
    /// Status wire name.
    pub status: String,
    /// Status display name.
    pub status_display: String,
    /// Status display colour.
    pub status_color: String,
    /// Priority wire name.
    pub priority: String,
    /// Assignee identifier, if assigned.
    pub assigned_to: Option<Uuid>,
    /// Validator identifier, if validated.
    pub validated_by: Option<Uuid>,
    /// Validation timestamp, if validated.
    pub validated_at: Option<DateTime<Utc>>,
    /// Latest rejection timestamp, if ever rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&ProjectTask> for TaskRepresentation {
    fn from(task: &ProjectTask) -> Self {
        Self {
            id: task.id().into_inner(),
            project_id: task.project_id().into_inner(),
            name: task.name().as_str().to_owned(),
            due_date: task.due_date(),
            progress: task.progress().value(),
            status: task.status().as_str().to_owned(),
            status_display: task.status().display_name().to_owned(),
            status_color: task.status().color().to_owned(),
            priority: task.priority().as_str().to_owned(),
            assigned_to: task.assigned_to().map(UserId::into_inner),
            validated_by: task.validated_by().map(UserId::into_inner),
            validated_at: task.validated_at(),
            rejected_at: task.rejected_at(),
            updated_at: task.updated_at(),
        }
    }
}
