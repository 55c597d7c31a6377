//! Project aggregate root and its validated scalars.

use super::{Priority, ProjectId, ProjectStatus, WorkflowDomainError};
use crate::directory::domain::{TeamId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated project display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    const MAX_LENGTH: usize = 200;

    /// Creates a validated project name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidProjectName`] when the value is
    /// empty after trimming or exceeds 200 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkflowDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() || normalized.chars().count() > Self::MAX_LENGTH {
            return Err(WorkflowDomainError::InvalidProjectName(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated date range a project runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSchedule {
    starts_on: NaiveDate,
    ends_on: NaiveDate,
}

impl ProjectSchedule {
    /// Creates a validated schedule.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::ScheduleEndsBeforeStart`] when the end
    /// date precedes the start date.
    pub fn new(starts_on: NaiveDate, ends_on: NaiveDate) -> Result<Self, WorkflowDomainError> {
        if ends_on < starts_on {
            return Err(WorkflowDomainError::ScheduleEndsBeforeStart {
                start: starts_on,
                end: ends_on,
            });
        }
        Ok(Self { starts_on, ends_on })
    }

    /// Returns the first day of the schedule.
    #[must_use]
    pub const fn starts_on(self) -> NaiveDate {
        self.starts_on
    }

    /// Returns the last day of the schedule.
    #[must_use]
    pub const fn ends_on(self) -> NaiveDate {
        self.ends_on
    }
}

/// Project aggregate root.
///
/// Project progress is not stored here: it is derived on read as the rounded
/// mean of the project's task progress values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: ProjectName,
    schedule: ProjectSchedule,
    status: ProjectStatus,
    priority: Priority,
    team_id: TeamId,
    created_by: UserId,
    manager: Option<UserId>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted project name.
    pub name: ProjectName,
    /// Persisted schedule.
    pub schedule: ProjectSchedule,
    /// Persisted lifecycle status.
    pub status: ProjectStatus,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted owning team.
    pub team_id: TeamId,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted assigned project manager, if any.
    pub manager: Option<UserId>,
    /// Persisted cancellation timestamp, if cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new planned project.
    #[must_use]
    pub fn new(
        name: ProjectName,
        schedule: ProjectSchedule,
        priority: Priority,
        team_id: TeamId,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ProjectId::new(),
            name,
            schedule,
            status: ProjectStatus::Planned,
            priority,
            team_id,
            created_by,
            manager: None,
            cancelled_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            schedule: data.schedule,
            status: data.status,
            priority: data.priority,
            team_id: data.team_id,
            created_by: data.created_by,
            manager: data.manager,
            cancelled_at: data.cancelled_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the schedule.
    #[must_use]
    pub const fn schedule(&self) -> ProjectSchedule {
        self.schedule
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the owning team.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the assigned project manager, if any.
    #[must_use]
    pub const fn manager(&self) -> Option<UserId> {
        self.manager
    }

    /// Returns the cancellation timestamp, if cancelled.
    #[must_use]
    pub const fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
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

    /// Assigns a project manager.
    pub fn assign_manager(&mut self, manager: UserId, clock: &impl Clock) {
        self.manager = Some(manager);
        self.touch(clock);
    }

    /// Changes the lifecycle status without cancellation semantics.
    pub fn set_status(&mut self, status: ProjectStatus, clock: &impl Clock) {
        self.status = status;
        self.touch(clock);
    }

    /// Replaces the schedule.
    pub fn reschedule(&mut self, schedule: ProjectSchedule, clock: &impl Clock) {
        self.schedule = schedule;
        self.touch(clock);
    }

    /// Cancels the project, stamping the cancellation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::ProjectAlreadyCancelled`] when called
    /// twice.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), WorkflowDomainError> {
        if self.cancelled_at.is_some() {
            return Err(WorkflowDomainError::ProjectAlreadyCancelled);
        }
        self.status = ProjectStatus::Cancelled;
        self.cancelled_at = Some(clock.utc());
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
