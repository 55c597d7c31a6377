//! Error types for directory domain validation and parsing.

use super::ids::{TeamId, UserId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while constructing or mutating directory domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryDomainError {
    /// The user name is empty, too long, or contains whitespace.
    #[error("invalid user name '{0}'")]
    InvalidUserName(String),

    /// The email address is malformed.
    #[error("invalid email address '{0}'")]
    InvalidEmailAddress(String),

    /// The team name is empty or too long.
    #[error("invalid team name '{0}'")]
    InvalidTeamName(String),

    /// The user account has been deactivated.
    #[error("user {0} is inactive")]
    InactiveUser(UserId),

    /// The team has been deactivated.
    #[error("team {0} is inactive")]
    InactiveTeam(TeamId),

    /// The membership row has been soft-removed.
    #[error("membership of user {user_id} in team {team_id} is inactive")]
    InactiveMembership {
        /// Team side of the membership.
        team_id: TeamId,
        /// User side of the membership.
        user_id: UserId,
    },

    /// The password-reset token expired before it was consumed.
    #[error("password-reset token expired at {0}")]
    TokenExpired(DateTime<Utc>),

    /// The password-reset token was already consumed.
    #[error("password-reset token was already consumed at {0}")]
    TokenConsumed(DateTime<Utc>),

    /// The supplied credential hash is empty.
    #[error("credential hash must not be empty")]
    EmptyCredentialHash,
}

/// Error returned while parsing role values from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
