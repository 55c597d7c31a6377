//! Password-reset token lifecycle.

use super::{DirectoryDomainError, UserId};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Single-use token authorizing one credential replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetToken {
    id: Uuid,
    user_id: UserId,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    consumed_at: Option<DateTime<Utc>>,
}

impl PasswordResetToken {
    /// Issues a token valid for `validity` from the clock's now.
    #[must_use]
    pub fn issue(user_id: UserId, validity: Duration, clock: &impl Clock) -> Self {
        let issued_at = clock.utc();
        Self {
            id: Uuid::new_v4(),
            user_id,
            issued_at,
            expires_at: issued_at + validity,
            consumed_at: None,
        }
    }

    /// Reconstructs a token from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: Uuid,
        user_id: UserId,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        consumed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            user_id,
            issued_at,
            expires_at,
            consumed_at,
        }
    }

    /// Returns the token identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the account the token belongs to.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the issue timestamp.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns the expiry timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns when the token was consumed, if ever.
    #[must_use]
    pub const fn consumed_at(&self) -> Option<DateTime<Utc>> {
        self.consumed_at
    }

    /// Marks the token consumed.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::TokenExpired`] when the clock's now is
    /// past the expiry, or [`DirectoryDomainError::TokenConsumed`] when the
    /// token was already used.
    pub fn consume(&mut self, clock: &impl Clock) -> Result<(), DirectoryDomainError> {
        if let Some(consumed_at) = self.consumed_at {
            return Err(DirectoryDomainError::TokenConsumed(consumed_at));
        }
        let now = clock.utc();
        if now > self.expires_at {
            return Err(DirectoryDomainError::TokenExpired(self.expires_at));
        }
        self.consumed_at = Some(now);
        Ok(())
    }
}
