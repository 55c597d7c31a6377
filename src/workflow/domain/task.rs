//! Project task aggregate root and its lifecycle transitions.

use super::{Priority, Progress, ProjectId, TaskId, TaskStatus, WorkflowDomainError};
use crate::directory::domain::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated task display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskName(String);

impl TaskName {
    const MAX_LENGTH: usize = 200;

    /// Creates a validated task name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidTaskName`] when the value is
    /// empty after trimming or exceeds 200 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkflowDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() || normalized.chars().count() > Self::MAX_LENGTH {
            return Err(WorkflowDomainError::InvalidTaskName(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Project task aggregate root.
///
/// Two invariants hold after every successful mutation: progress is 100
/// exactly when the status is awaiting validation or validated, and a task
/// in `Todo` always reports zero progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTask {
    id: TaskId,
    project_id: ProjectId,
    name: TaskName,
    due_date: NaiveDate,
    progress: Progress,
    status: TaskStatus,
    priority: Priority,
    assigned_to: Option<UserId>,
    created_by: UserId,
    validated_by: Option<UserId>,
    validated_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    progress_before_submission: Option<Progress>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted parent project.
    pub project_id: ProjectId,
    /// Persisted task name.
    pub name: TaskName,
    /// Persisted due date.
    pub due_date: NaiveDate,
    /// Persisted progress percentage.
    pub progress: Progress,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted assignee, if any.
    pub assigned_to: Option<UserId>,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted validator, if validated.
    pub validated_by: Option<UserId>,
    /// Persisted validation timestamp, if validated.
    pub validated_at: Option<DateTime<Utc>>,
    /// Persisted latest rejection timestamp, if ever rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Persisted progress snapshot taken at submission, if submitted.
    pub progress_before_submission: Option<Progress>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ProjectTask {
    /// Creates a new task in `Todo` with zero progress.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        name: TaskName,
        due_date: NaiveDate,
        priority: Priority,
        assigned_to: Option<UserId>,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            project_id,
            name,
            due_date,
            progress: Progress::ZERO,
            status: TaskStatus::Todo,
            priority,
            assigned_to,
            created_by,
            validated_by: None,
            validated_at: None,
            rejected_at: None,
            progress_before_submission: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            name: data.name,
            due_date: data.due_date,
            progress: data.progress,
            status: data.status,
            priority: data.priority,
            assigned_to: data.assigned_to,
            created_by: data.created_by,
            validated_by: data.validated_by,
            validated_at: data.validated_at,
            rejected_at: data.rejected_at,
            progress_before_submission: data.progress_before_submission,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the parent project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Returns the progress percentage.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the validator, if validated.
    #[must_use]
    pub const fn validated_by(&self) -> Option<UserId> {
        self.validated_by
    }

    /// Returns the validation timestamp, if validated.
    #[must_use]
    pub const fn validated_at(&self) -> Option<DateTime<Utc>> {
        self.validated_at
    }

    /// Returns the latest rejection timestamp, if ever rejected.
    #[must_use]
    pub const fn rejected_at(&self) -> Option<DateTime<Utc>> {
        self.rejected_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the progress snapshot taken at submission, if submitted.
    #[must_use]
    pub const fn progress_before_submission(&self) -> Option<Progress> {
        self.progress_before_submission
    }

    /// Returns the progress the assignee last recorded before submitting,
    /// used when a rejection resumes work.
    #[must_use]
    pub fn resumption_progress(&self) -> Progress {
        self.progress_before_submission.unwrap_or(Progress::ZERO)
    }

    /// Returns whether the given user may currently edit the task.
    #[must_use]
    pub fn is_editable_by(&self, user_id: UserId) -> bool {
        self.assigned_to == Some(user_id) && !self.status.is_locked()
    }

    /// Records an assignee progress update.
    ///
    /// Setting progress to 100 submits the work: the status is forced to
    /// [`TaskStatus::AwaitingValidation`] regardless of `requested_status`,
    /// and the previous progress is snapshotted for a later rejection.
    /// Below 100 the status follows the caller's choice of `Todo` or
    /// `InProgress`, defaulting on the recorded progress.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::TaskLocked`] when the task awaits
    /// validation or is validated, [`WorkflowDomainError::StatusNotRequestable`]
    /// when the caller requests a locked status explicitly,
    /// [`WorkflowDomainError::ProgressStatusMismatch`] when `Todo` is
    /// requested with non-zero progress, and
    /// [`WorkflowDomainError::InvalidStateTransition`] when the resulting
    /// status change is not in the transition table.
    pub fn record_progress(
        &mut self,
        progress: Progress,
        requested_status: Option<TaskStatus>,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        if self.status.is_locked() {
            return Err(WorkflowDomainError::TaskLocked {
                task_id: self.id,
                status: self.status,
            });
        }
        if let Some(requested) = requested_status {
            if requested.is_locked() {
                return Err(WorkflowDomainError::StatusNotRequestable { status: requested });
            }
        }

        let target = if progress.is_complete() {
            TaskStatus::AwaitingValidation
        } else {
            requested_status.unwrap_or(if progress == Progress::ZERO {
                TaskStatus::Todo
            } else {
                TaskStatus::InProgress
            })
        };
        if target == TaskStatus::Todo && progress != Progress::ZERO {
            return Err(WorkflowDomainError::ProgressStatusMismatch {
                status: target,
                progress: progress.as_i16(),
            });
        }
        if target != self.status && !self.status.can_transition_to(target) {
            return Err(WorkflowDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }

        if progress.is_complete() {
            self.progress_before_submission = Some(self.progress);
        }
        self.progress = progress;
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Approves submitted work.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidStateTransition`] unless the
    /// task awaits validation; the task is left untouched on failure.
    pub fn approve(
        &mut self,
        validator: UserId,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        if !self.status.can_transition_to(TaskStatus::Validated) {
            return Err(WorkflowDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.status,
                to: TaskStatus::Validated,
            });
        }
        self.status = TaskStatus::Validated;
        self.validated_by = Some(validator);
        self.validated_at = Some(clock.utc());
        self.progress_before_submission = None;
        self.touch(clock);
        Ok(())
    }

    /// Sends submitted work back to the assignee.
    ///
    /// Clears the validation fields, stamps the rejection timestamp, and
    /// resumes at `resumed_progress`; the reason itself is persisted as a
    /// comment by the service layer.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidStateTransition`] unless the
    /// task awaits validation, or
    /// [`WorkflowDomainError::ProgressStatusMismatch`] when the resumed
    /// progress is 100.
    pub fn send_back(
        &mut self,
        resumed_progress: Progress,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        if self.status != TaskStatus::AwaitingValidation {
            return Err(WorkflowDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.status,
                to: TaskStatus::InProgress,
            });
        }
        if resumed_progress.is_complete() {
            return Err(WorkflowDomainError::ProgressStatusMismatch {
                status: TaskStatus::InProgress,
                progress: resumed_progress.as_i16(),
            });
        }
        self.status = TaskStatus::InProgress;
        self.progress = resumed_progress;
        self.validated_by = None;
        self.validated_at = None;
        self.rejected_at = Some(clock.utc());
        self.progress_before_submission = None;
        self.touch(clock);
        Ok(())
    }

    /// Reassigns the task to another user.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::TaskLocked`] when the task awaits
    /// validation or is validated.
    pub fn reassign(
        &mut self,
        assignee: UserId,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        if self.status.is_locked() {
            return Err(WorkflowDomainError::TaskLocked {
                task_id: self.id,
                status: self.status,
            });
        }
        self.assigned_to = Some(assignee);
        self.touch(clock);
        Ok(())
    }

    /// Reports whether the progress/status invariants hold.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        let complete_matches_status = self.progress.is_complete() == self.status.is_locked();
        let todo_is_unstarted =
            self.status != TaskStatus::Todo || self.progress == Progress::ZERO;
        complete_matches_status && todo_is_unstarted
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
