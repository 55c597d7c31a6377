//! Repository port for directory persistence and uniqueness enforcement.

use crate::directory::domain::{
    EmailAddress, PasswordResetToken, Team, TeamId, TeamMembership, User, UserId, UserName,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Result type for directory repository operations.
pub type DirectoryRepositoryResult<T> = Result<T, DirectoryRepositoryError>;

/// Directory persistence contract.
///
/// Uniqueness rules enforced by every implementation: one account per user
/// name, one account per email address, and at most one membership row per
/// `(team, user)` pair.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Stores a new user account.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::DuplicateUserName`] or
    /// [`DirectoryRepositoryError::DuplicateEmail`] when either unique key is
    /// already taken, or [`DirectoryRepositoryError::DuplicateUser`] when the
    /// identifier itself collides.
    async fn insert_user(&self, user: &User) -> DirectoryRepositoryResult<()>;

    /// Persists changes to an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::UserNotFound`] when the account
    /// does not exist.
    async fn update_user(&self, user: &User) -> DirectoryRepositoryResult<()>;

    /// Finds a user by identifier. Returns `None` when absent.
    async fn find_user(&self, id: UserId) -> DirectoryRepositoryResult<Option<User>>;

    /// Finds a user by account name. Returns `None` when absent.
    async fn find_user_by_name(&self, name: &UserName)
    -> DirectoryRepositoryResult<Option<User>>;

    /// Finds a user by email address. Returns `None` when absent.
    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> DirectoryRepositoryResult<Option<User>>;

    /// Stores a new team.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::DuplicateTeam`] when the
    /// identifier collides.
    async fn insert_team(&self, team: &Team) -> DirectoryRepositoryResult<()>;

    /// Persists changes to an existing team.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::TeamNotFound`] when the team does
    /// not exist.
    async fn update_team(&self, team: &Team) -> DirectoryRepositoryResult<()>;

    /// Finds a team by identifier. Returns `None` when absent.
    async fn find_team(&self, id: TeamId) -> DirectoryRepositoryResult<Option<Team>>;

    /// Deletes a team and cascades its membership rows.
    ///
    /// Callers must have authorized the deletion beforehand; the repository
    /// removes the team and every membership row it owns, returning the
    /// number of memberships cascaded.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::TeamNotFound`] when the team does
    /// not exist.
    async fn delete_team(&self, id: TeamId) -> DirectoryRepositoryResult<u64>;

    /// Deletes a user and cascades their membership rows.
    ///
    /// Callers must have authorized the deletion beforehand. Returns the
    /// number of memberships cascaded.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::UserNotFound`] when the account
    /// does not exist.
    async fn delete_user(&self, id: UserId) -> DirectoryRepositoryResult<u64>;

    /// Stores a new membership row.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::DuplicateMembership`] when a row
    /// for the `(team, user)` pair already exists.
    async fn insert_membership(
        &self,
        membership: &TeamMembership,
    ) -> DirectoryRepositoryResult<()>;

    /// Persists changes to an existing membership row.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::MembershipNotFound`] when no row
    /// exists for the pair.
    async fn update_membership(
        &self,
        membership: &TeamMembership,
    ) -> DirectoryRepositoryResult<()>;

    /// Finds the membership row for a `(team, user)` pair. Returns `None`
    /// when absent.
    async fn find_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> DirectoryRepositoryResult<Option<TeamMembership>>;

    /// Returns the active memberships of one user across all teams.
    async fn memberships_for_user(
        &self,
        user_id: UserId,
    ) -> DirectoryRepositoryResult<Vec<TeamMembership>>;

    /// Returns the users holding an active project-manager membership in the
    /// given team.
    async fn project_managers_of(&self, team_id: TeamId)
    -> DirectoryRepositoryResult<Vec<UserId>>;

    /// Stores a new password-reset token.
    async fn insert_reset_token(
        &self,
        token: &PasswordResetToken,
    ) -> DirectoryRepositoryResult<()>;

    /// Finds a password-reset token by identifier. Returns `None` when
    /// absent.
    async fn find_reset_token(
        &self,
        id: Uuid,
    ) -> DirectoryRepositoryResult<Option<PasswordResetToken>>;

    /// Persists changes to an existing password-reset token.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::ResetTokenNotFound`] when the
    /// token does not exist.
    async fn update_reset_token(
        &self,
        token: &PasswordResetToken,
    ) -> DirectoryRepositoryResult<()>;
}

/// Errors returned by directory repository implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryRepositoryError {
    /// A user with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// The account name is already taken.
    #[error("duplicate user name: {0}")]
    DuplicateUserName(UserName),

    /// The email address is already taken.
    #[error("duplicate email address: {0}")]
    DuplicateEmail(EmailAddress),

    /// A team with the same identifier already exists.
    #[error("duplicate team identifier: {0}")]
    DuplicateTeam(TeamId),

    /// A membership row for the pair already exists.
    #[error("duplicate membership for user {user_id} in team {team_id}")]
    DuplicateMembership {
        /// Team side of the composite identity.
        team_id: TeamId,
        /// User side of the composite identity.
        user_id: UserId,
    },

    /// The user was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The team was not found.
    #[error("team not found: {0}")]
    TeamNotFound(TeamId),

    /// No membership row exists for the pair.
    #[error("membership not found for user {user_id} in team {team_id}")]
    MembershipNotFound {
        /// Team side of the composite identity.
        team_id: TeamId,
        /// User side of the composite identity.
        user_id: UserId,
    },

    /// The password-reset token was not found.
    #[error("password-reset token not found: {0}")]
    ResetTokenNotFound(Uuid),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for DirectoryRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
