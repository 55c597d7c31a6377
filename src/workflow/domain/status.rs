//! Closed status and priority enumerations with display metadata.
//!
//! The original data model kept statuses and priorities as lookup-table rows
//! referenced by small integers; here they are closed enumerations with
//! exhaustive matching at every transition site, so an invalid-integer state
//! cannot exist.

use super::ParseStatusError;
use serde::{Deserialize, Serialize};

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started; progress is zero.
    Todo,
    /// Work is underway and editable by the assignee.
    InProgress,
    /// Progress reached 100 and a project manager must decide.
    AwaitingValidation,
    /// A project manager approved the work. Terminal.
    Validated,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::AwaitingValidation => "awaiting_validation",
            Self::Validated => "validated",
        }
    }

    /// Returns the human-readable name shown by dashboards.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Todo => "To do",
            Self::InProgress => "In progress",
            Self::AwaitingValidation => "Awaiting validation",
            Self::Validated => "Validated",
        }
    }

    /// Returns the display colour associated with the status.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Todo => "#6c757d",
            Self::InProgress => "#0d6efd",
            Self::AwaitingValidation => "#fd7e14",
            Self::Validated => "#198754",
        }
    }

    /// Returns whether moving from `self` to `target` is a legal transition.
    ///
    /// Self-transitions are not table transitions: progress edits inside one
    /// status never consult this table.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Todo, Self::InProgress | Self::AwaitingValidation)
            | (Self::InProgress, Self::Todo | Self::AwaitingValidation)
            | (Self::AwaitingValidation, Self::InProgress | Self::Validated) => true,
            (Self::Todo | Self::InProgress | Self::AwaitingValidation | Self::Validated, _) => {
                false
            }
        }
    }

    /// Returns whether the status locks the task against assignee edits.
    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::AwaitingValidation | Self::Validated)
    }

    /// Returns whether the status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Validated)
    }

    /// Returns whether the status counts as unfinished for reporting.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !self.is_terminal()
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "awaiting_validation" => Ok(Self::AwaitingValidation),
            "validated" => Ok(Self::Validated),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Scheduled but not yet underway.
    Planned,
    /// Work is underway.
    Active,
    /// Temporarily paused.
    OnHold,
    /// All work finished.
    Completed,
    /// Abandoned; stamps a cancellation timestamp on the project.
    Cancelled,
}

impl ProjectStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns the human-readable name shown by dashboards.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::Active => "Active",
            Self::OnHold => "On hold",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Returns the display colour associated with the status.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Planned => "#6c757d",
            Self::Active => "#0d6efd",
            Self::OnHold => "#fd7e14",
            Self::Completed => "#198754",
            Self::Cancelled => "#dc3545",
        }
    }

    /// Returns whether the status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl TryFrom<&str> for ProjectStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "planned" => Ok(Self::Planned),
            "active" => Ok(Self::Active),
            "on_hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}

/// Priority referenced by projects and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default ordering.
    Medium,
    /// Should be picked up next.
    High,
    /// Drop everything else.
    Urgent,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Returns the human-readable name shown by dashboards.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }

    /// Returns the display colour associated with the priority.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "#6c757d",
            Self::Medium => "#0dcaf0",
            Self::High => "#fd7e14",
            Self::Urgent => "#dc3545",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}
