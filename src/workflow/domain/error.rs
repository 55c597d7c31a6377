//! Error types for workflow domain validation and parsing.

use super::ids::TaskId;
use super::status::TaskStatus;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing or mutating workflow domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowDomainError {
    /// The progress percentage lies outside `[0, 100]`.
    #[error("progress {0} is out of range, expected 0..=100")]
    ProgressOutOfRange(i16),

    /// The requested transition is not legal from the current status.
    #[error("task {task_id} cannot move from {} to {}", from.as_str(), to.as_str())]
    InvalidStateTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Status the task currently holds.
        from: TaskStatus,
        /// Status the transition requested.
        to: TaskStatus,
    },

    /// The task is locked for assignee edits until a project manager acts.
    #[error("task {task_id} is locked in status {}", status.as_str())]
    TaskLocked {
        /// Task whose edit was rejected.
        task_id: TaskId,
        /// Locked status the task holds.
        status: TaskStatus,
    },

    /// The requested status does not agree with the recorded progress.
    #[error("status {} does not agree with progress {progress}", status.as_str())]
    ProgressStatusMismatch {
        /// Requested status.
        status: TaskStatus,
        /// Recorded progress percentage.
        progress: i16,
    },

    /// Progress updates may only request an editable status.
    #[error("status {} may not be requested through a progress update", status.as_str())]
    StatusNotRequestable {
        /// Requested status.
        status: TaskStatus,
    },

    /// The rejection reason is empty after trimming.
    #[error("rejection reason must not be empty")]
    EmptyRejectionReason,

    /// The rejection reason exceeds the configured limit.
    #[error("rejection reason is {length} characters, exceeds limit of {limit}")]
    RejectionReasonTooLong {
        /// Character count of the supplied reason.
        length: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The comment body is empty after trimming.
    #[error("comment body must not be empty")]
    EmptyCommentBody,

    /// The comment body exceeds the configured limit.
    #[error("comment body is {length} characters, exceeds limit of {limit}")]
    CommentTooLong {
        /// Character count of the supplied body.
        length: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The project name is empty or too long.
    #[error("invalid project name '{0}'")]
    InvalidProjectName(String),

    /// The task name is empty or too long.
    #[error("invalid task name '{0}'")]
    InvalidTaskName(String),

    /// The file name is empty, too long, or contains path separators.
    #[error("invalid file name '{0}'")]
    InvalidFileName(String),

    /// The schedule ends before it starts.
    #[error("schedule ends {end} before it starts {start}")]
    ScheduleEndsBeforeStart {
        /// First day of the schedule.
        start: NaiveDate,
        /// Last day of the schedule.
        end: NaiveDate,
    },

    /// The project was already cancelled.
    #[error("project was already cancelled")]
    ProjectAlreadyCancelled,
}

/// Error returned while parsing task or project statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

/// Error returned while parsing notification kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification kind: {0}")]
pub struct ParseNotificationKindError(pub String);
