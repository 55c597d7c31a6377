//! Task comments and the validated bodies they carry.

use super::{CommentId, TaskId, WorkflowDomainError};
use crate::directory::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated free-text comment body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentBody(String);

impl CommentBody {
    /// Creates a validated comment body.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::EmptyCommentBody`] when the value is
    /// empty after trimming, or [`WorkflowDomainError::CommentTooLong`] when
    /// it exceeds `limit` characters.
    pub fn new(value: impl Into<String>, limit: usize) -> Result<Self, WorkflowDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(WorkflowDomainError::EmptyCommentBody);
        }
        let length = normalized.chars().count();
        if length > limit {
            return Err(WorkflowDomainError::CommentTooLong { length, limit });
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the body as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CommentBody {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CommentBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated reason a project manager supplies when sending work back.
///
/// Kept distinct from [`CommentBody`] so the two length policies can drift
/// independently, though a reason is ultimately persisted as a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RejectionReason(String);

impl RejectionReason {
    /// Creates a validated rejection reason.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::EmptyRejectionReason`] when the value
    /// is empty after trimming, or
    /// [`WorkflowDomainError::RejectionReasonTooLong`] when it exceeds
    /// `limit` characters.
    pub fn new(value: impl Into<String>, limit: usize) -> Result<Self, WorkflowDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(WorkflowDomainError::EmptyRejectionReason);
        }
        let length = normalized.chars().count();
        if length > limit {
            return Err(WorkflowDomainError::RejectionReasonTooLong { length, limit });
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the reason as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the reason into a comment body.
    ///
    /// The reason was validated at construction, so the conversion cannot
    /// fail for any comment limit at least as large as the reason limit.
    #[must_use]
    pub fn into_comment_body(self) -> CommentBody {
        CommentBody(self.0)
    }
}

impl AsRef<str> for RejectionReason {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-text note attached to one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    task_id: TaskId,
    author: UserId,
    body: CommentBody,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment.
    #[must_use]
    pub fn new(task_id: TaskId, author: UserId, body: CommentBody, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: CommentId::new(),
            task_id,
            author,
            body,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a comment from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: CommentId,
        task_id: TaskId,
        author: UserId,
        body: CommentBody,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            author,
            body,
            created_at,
            updated_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the task the comment is attached to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the body.
    #[must_use]
    pub const fn body(&self) -> &CommentBody {
        &self.body
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest edit timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the body.
    pub fn edit(&mut self, body: CommentBody, clock: &impl Clock) {
        self.body = body;
        self.updated_at = clock.utc();
    }
}
