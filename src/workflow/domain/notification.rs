//! Notification rows emitted as workflow side effects.

use super::{NotificationId, ParseNotificationKindError, ProjectId, TaskId};
use crate::directory::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Notification category.
///
/// The four workflow kinds are emitted by task transitions; the four general
/// kinds are available to callers posting ad-hoc notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A task was assigned to the recipient.
    Assigned,
    /// A task of the recipient's project reached 100% and awaits a decision.
    AwaitingValidation,
    /// The recipient's submitted task was approved.
    Validated,
    /// The recipient's submitted task was sent back with a reason.
    Rejected,
    /// General informational notice.
    Info,
    /// General warning notice.
    Warning,
    /// General success notice.
    Success,
    /// General error notice.
    Error,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::AwaitingValidation => "awaiting_validation",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = ParseNotificationKindError;

    fn try_from(value: &str) -> Result<Self, ParseNotificationKindError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "assigned" => Ok(Self::Assigned),
            "awaiting_validation" => Ok(Self::AwaitingValidation),
            "validated" => Ok(Self::Validated),
            "rejected" => Ok(Self::Rejected),
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            _ => Err(ParseNotificationKindError(value.to_owned())),
        }
    }
}

/// Notification addressed to one user, optionally correlated to a project,
/// task, and acting user.
///
/// Correlations are informational: deleting the correlated project or task
/// nulls them without deleting the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    recipient: UserId,
    kind: NotificationKind,
    body: String,
    project_id: Option<ProjectId>,
    task_id: Option<TaskId>,
    actor: Option<UserId>,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates a new unread notification.
    #[must_use]
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        body: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient,
            kind,
            body: body.into(),
            project_id: None,
            task_id: None,
            actor: None,
            read_at: None,
            created_at: clock.utc(),
        }
    }

    /// Correlates the notification with a project.
    #[must_use]
    pub const fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Correlates the notification with a task.
    #[must_use]
    pub const fn with_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Correlates the notification with the acting user.
    #[must_use]
    pub const fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Reconstructs a notification from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: NotificationId,
        recipient: UserId,
        kind: NotificationKind,
        body: String,
        project_id: Option<ProjectId>,
        task_id: Option<TaskId>,
        actor: Option<UserId>,
        read_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            recipient,
            kind,
            body,
            project_id,
            task_id,
            actor,
            read_at,
            created_at,
        }
    }

    /// Returns the notification identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn recipient(&self) -> UserId {
        self.recipient
    }

    /// Returns the category.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns the rendered body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the correlated project, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns the correlated task, if any.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns the acting user, if recorded.
    #[must_use]
    pub const fn actor(&self) -> Option<UserId> {
        self.actor
    }

    /// Returns when the notification was read, if it was.
    #[must_use]
    pub const fn read_at(&self) -> Option<DateTime<Utc>> {
        self.read_at
    }

    /// Returns whether the notification is unread.
    #[must_use]
    pub const fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Stamps the read timestamp. Reading twice keeps the first stamp.
    pub fn mark_read(&mut self, clock: &impl Clock) {
        if self.read_at.is_none() {
            self.read_at = Some(clock.utc());
        }
    }
}
