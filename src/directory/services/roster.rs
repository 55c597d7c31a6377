//! Service layer for account, team, and membership management.

use crate::directory::{
    domain::{
        Capability, CapabilitySet, DirectoryDomainError, EmailAddress, PasswordResetToken, Role,
        Team, TeamId, TeamMembership, TeamName, User, UserId, UserName,
    },
    ports::{DirectoryRepository, DirectoryRepositoryError},
};
use chrono::Duration;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Request payload for registering a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    name: String,
    email: String,
    credential_hash: String,
    role: Role,
}

impl RegisterUserRequest {
    /// Creates a registration request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        credential_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            credential_hash: credential_hash.into(),
            role,
        }
    }
}

/// Request payload for adding a user to a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddMemberRequest {
    team_id: TeamId,
    user_id: UserId,
    project_manager: bool,
}

impl AddMemberRequest {
    /// Creates a membership request without project-manager authority.
    #[must_use]
    pub const fn new(team_id: TeamId, user_id: UserId) -> Self {
        Self {
            team_id,
            user_id,
            project_manager: false,
        }
    }

    /// Grants project-manager authority on join.
    #[must_use]
    pub const fn as_project_manager(mut self) -> Self {
        self.project_manager = true;
        self
    }
}

/// Service-level errors for roster operations.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] DirectoryDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] DirectoryRepositoryError),

    /// The referenced user does not exist.
    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    /// The referenced team does not exist.
    #[error("unknown team: {0}")]
    UnknownTeam(TeamId),

    /// No membership row exists for the pair.
    #[error("user {user_id} is not a member of team {team_id}")]
    UnknownMembership {
        /// Team side of the composite identity.
        team_id: TeamId,
        /// User side of the composite identity.
        user_id: UserId,
    },

    /// The referenced password-reset token does not exist.
    #[error("unknown password-reset token: {0}")]
    UnknownResetToken(Uuid),
}

/// Result type for roster service operations.
pub type RosterResult<T> = Result<T, RosterError>;

/// Roster orchestration service.
#[derive(Clone)]
pub struct RosterService<R, C>
where
    R: DirectoryRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> RosterService<R, C>
where
    R: DirectoryRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new roster service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Registers a new user account.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] when input validation fails or either unique
    /// key is already taken.
    pub async fn register_user(&self, request: RegisterUserRequest) -> RosterResult<User> {
        let name = UserName::new(request.name)?;
        let email = EmailAddress::new(request.email)?;
        let user = User::new(name, email, request.credential_hash, request.role, &*self.clock)?;
        self.repository.insert_user(&user).await?;
        tracing::debug!(user = %user.id(), role = user.role().as_str(), "registered user");
        Ok(user)
    }

    /// Creates a new team.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] when the name is invalid or persistence fails.
    pub async fn create_team(&self, name: impl Into<String> + Send) -> RosterResult<Team> {
        let team = Team::new(TeamName::new(name)?, &*self.clock);
        self.repository.insert_team(&team).await?;
        Ok(team)
    }

    /// Adds a user to a team, reactivating a soft-removed membership when one
    /// exists for the pair.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] when either side is unknown or inactive, or
    /// when an active membership already exists.
    pub async fn add_member(&self, request: AddMemberRequest) -> RosterResult<TeamMembership> {
        let team = self
            .repository
            .find_team(request.team_id)
            .await?
            .ok_or(RosterError::UnknownTeam(request.team_id))?;
        if !team.is_active() {
            return Err(DirectoryDomainError::InactiveTeam(team.id()).into());
        }
        let user = self
            .repository
            .find_user(request.user_id)
            .await?
            .ok_or(RosterError::UnknownUser(request.user_id))?;
        if !user.is_active() {
            return Err(DirectoryDomainError::InactiveUser(user.id()).into());
        }

        let existing = self
            .repository
            .find_membership(request.team_id, request.user_id)
            .await?;
        if let Some(mut membership) = existing {
            if membership.is_active() {
                return Err(DirectoryRepositoryError::DuplicateMembership {
                    team_id: request.team_id,
                    user_id: request.user_id,
                }
                .into());
            }
            membership.reactivate(&*self.clock);
            if request.project_manager {
                membership.grant_project_manager(&*self.clock);
            }
            self.repository.update_membership(&membership).await?;
            return Ok(membership);
        }

        let membership = TeamMembership::new(
            request.team_id,
            request.user_id,
            request.project_manager,
            &*self.clock,
        );
        self.repository.insert_membership(&membership).await?;
        tracing::debug!(
            team = %request.team_id,
            user = %request.user_id,
            project_manager = request.project_manager,
            "added team member",
        );
        Ok(membership)
    }

    /// Grants or revokes project-manager authority for a membership.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownMembership`] when no row exists for the
    /// pair, or a domain error when the membership is soft-removed.
    pub async fn set_project_manager(
        &self,
        team_id: TeamId,
        user_id: UserId,
        grant: bool,
    ) -> RosterResult<TeamMembership> {
        let mut membership = self
            .repository
            .find_membership(team_id, user_id)
            .await?
            .ok_or(RosterError::UnknownMembership { team_id, user_id })?;
        if !membership.is_active() {
            return Err(DirectoryDomainError::InactiveMembership { team_id, user_id }.into());
        }
        if grant {
            membership.grant_project_manager(&*self.clock);
        } else {
            membership.revoke_project_manager(&*self.clock);
        }
        self.repository.update_membership(&membership).await?;
        Ok(membership)
    }

    /// Soft-removes a member from a team.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownMembership`] when no row exists for the
    /// pair.
    pub async fn remove_member(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> RosterResult<TeamMembership> {
        let mut membership = self
            .repository
            .find_membership(team_id, user_id)
            .await?
            .ok_or(RosterError::UnknownMembership { team_id, user_id })?;
        membership.deactivate(&*self.clock);
        self.repository.update_membership(&membership).await?;
        Ok(membership)
    }

    /// Resolves the caller's capability set for one request.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownUser`] when the account does not exist
    /// and [`DirectoryDomainError::InactiveUser`] when it is deactivated;
    /// inactive accounts never resolve to an empty grant set.
    pub async fn capabilities_for(&self, user_id: UserId) -> RosterResult<CapabilitySet> {
        let user = self
            .repository
            .find_user(user_id)
            .await?
            .ok_or(RosterError::UnknownUser(user_id))?;
        if !user.is_active() {
            return Err(DirectoryDomainError::InactiveUser(user_id).into());
        }

        let mut grants = vec![Capability::CommentOnTask];
        match user.role() {
            Role::Developer | Role::ProjectManager => grants.push(Capability::EditAssignedTask),
            Role::Manager => {
                grants.push(Capability::ManageRoster);
                grants.push(Capability::ViewReports);
            }
        }
        for membership in self.repository.memberships_for_user(user_id).await? {
            if membership.is_project_manager() {
                grants.push(Capability::ManageTasks {
                    team_id: membership.team_id(),
                });
            }
        }

        Ok(CapabilitySet::new(
            user.id(),
            user.name().clone(),
            user.role(),
            grants,
        ))
    }

    /// Issues a password-reset token and flags the account for a forced
    /// password change.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownUser`] when the account does not exist.
    pub async fn issue_password_reset(
        &self,
        user_id: UserId,
        validity: Duration,
    ) -> RosterResult<PasswordResetToken> {
        let mut user = self
            .repository
            .find_user(user_id)
            .await?
            .ok_or(RosterError::UnknownUser(user_id))?;
        let token = PasswordResetToken::issue(user_id, validity, &*self.clock);
        self.repository.insert_reset_token(&token).await?;
        user.require_password_change(&*self.clock);
        self.repository.update_user(&user).await?;
        Ok(token)
    }

    /// Completes a password reset: consumes the token, stores the new
    /// credential hash, and clears the must-change flag.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] when the token is unknown, expired, or already
    /// consumed, or when the new hash is empty.
    pub async fn complete_password_reset(
        &self,
        token_id: Uuid,
        new_credential_hash: impl Into<String> + Send,
    ) -> RosterResult<User> {
        let mut token = self
            .repository
            .find_reset_token(token_id)
            .await?
            .ok_or(RosterError::UnknownResetToken(token_id))?;
        token.consume(&*self.clock)?;

        let mut user = self
            .repository
            .find_user(token.user_id())
            .await?
            .ok_or(RosterError::UnknownUser(token.user_id()))?;
        user.set_credential(new_credential_hash, &*self.clock)?;

        self.repository.update_reset_token(&token).await?;
        self.repository.update_user(&user).await?;
        tracing::debug!(user = %user.id(), "completed password reset");
        Ok(user)
    }
}
