//! In-memory repository for directory tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::directory::{
    domain::{
        EmailAddress, PasswordResetToken, Team, TeamId, TeamMembership, User, UserId, UserName,
    },
    ports::{DirectoryRepository, DirectoryRepositoryError, DirectoryRepositoryResult},
};

/// Thread-safe in-memory directory repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectoryRepository {
    state: Arc<RwLock<InMemoryDirectoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryDirectoryState {
    users: HashMap<UserId, User>,
    name_index: HashMap<UserName, UserId>,
    email_index: HashMap<EmailAddress, UserId>,
    teams: HashMap<TeamId, Team>,
    memberships: HashMap<(TeamId, UserId), TeamMembership>,
    reset_tokens: HashMap<Uuid, PasswordResetToken>,
}

impl InMemoryDirectoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> DirectoryRepositoryError {
    DirectoryRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn insert_user(&self, user: &User) -> DirectoryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.users.contains_key(&user.id()) {
            return Err(DirectoryRepositoryError::DuplicateUser(user.id()));
        }
        if state.name_index.contains_key(user.name()) {
            return Err(DirectoryRepositoryError::DuplicateUserName(
                user.name().clone(),
            ));
        }
        if state.email_index.contains_key(user.email()) {
            return Err(DirectoryRepositoryError::DuplicateEmail(
                user.email().clone(),
            ));
        }
        state.name_index.insert(user.name().clone(), user.id());
        state.email_index.insert(user.email().clone(), user.id());
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> DirectoryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let previous = state
            .users
            .get(&user.id())
            .ok_or(DirectoryRepositoryError::UserNotFound(user.id()))?
            .clone();
        state.name_index.remove(previous.name());
        state.email_index.remove(previous.email());
        state.name_index.insert(user.name().clone(), user.id());
        state.email_index.insert(user.email().clone(), user.id());
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> DirectoryRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_user_by_name(
        &self,
        name: &UserName,
    ) -> DirectoryRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let user = state
            .name_index
            .get(name)
            .and_then(|id| state.users.get(id))
            .cloned();
        Ok(user)
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> DirectoryRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let user = state
            .email_index
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned();
        Ok(user)
    }

    async fn insert_team(&self, team: &Team) -> DirectoryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.teams.contains_key(&team.id()) {
            return Err(DirectoryRepositoryError::DuplicateTeam(team.id()));
        }
        state.teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn update_team(&self, team: &Team) -> DirectoryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.teams.contains_key(&team.id()) {
            return Err(DirectoryRepositoryError::TeamNotFound(team.id()));
        }
        state.teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn find_team(&self, id: TeamId) -> DirectoryRepositoryResult<Option<Team>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.teams.get(&id).cloned())
    }

    async fn delete_team(&self, id: TeamId) -> DirectoryRepositoryResult<u64> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.teams.remove(&id).is_none() {
            return Err(DirectoryRepositoryError::TeamNotFound(id));
        }
        let before = state.memberships.len();
        state.memberships.retain(|(team_id, _), _| *team_id != id);
        let cascaded = before.saturating_sub(state.memberships.len());
        Ok(u64::try_from(cascaded).map_err(DirectoryRepositoryError::persistence)?)
    }

    async fn delete_user(&self, id: UserId) -> DirectoryRepositoryResult<u64> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let user = state
            .users
            .remove(&id)
            .ok_or(DirectoryRepositoryError::UserNotFound(id))?;
        state.name_index.remove(user.name());
        state.email_index.remove(user.email());
        state.reset_tokens.retain(|_, token| token.user_id() != id);
        let before = state.memberships.len();
        state.memberships.retain(|(_, user_id), _| *user_id != id);
        let cascaded = before.saturating_sub(state.memberships.len());
        Ok(u64::try_from(cascaded).map_err(DirectoryRepositoryError::persistence)?)
    }

    async fn insert_membership(
        &self,
        membership: &TeamMembership,
    ) -> DirectoryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let key = (membership.team_id(), membership.user_id());
        if state.memberships.contains_key(&key) {
            return Err(DirectoryRepositoryError::DuplicateMembership {
                team_id: membership.team_id(),
                user_id: membership.user_id(),
            });
        }
        state.memberships.insert(key, membership.clone());
        Ok(())
    }

    async fn update_membership(
        &self,
        membership: &TeamMembership,
    ) -> DirectoryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let key = (membership.team_id(), membership.user_id());
        if !state.memberships.contains_key(&key) {
            return Err(DirectoryRepositoryError::MembershipNotFound {
                team_id: membership.team_id(),
                user_id: membership.user_id(),
            });
        }
        state.memberships.insert(key, membership.clone());
        Ok(())
    }

    async fn find_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> DirectoryRepositoryResult<Option<TeamMembership>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.memberships.get(&(team_id, user_id)).cloned())
    }

    async fn memberships_for_user(
        &self,
        user_id: UserId,
    ) -> DirectoryRepositoryResult<Vec<TeamMembership>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let memberships = state
            .memberships
            .values()
            .filter(|membership| membership.user_id() == user_id && membership.is_active())
            .cloned()
            .collect();
        Ok(memberships)
    }

    async fn project_managers_of(
        &self,
        team_id: TeamId,
    ) -> DirectoryRepositoryResult<Vec<UserId>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let managers = state
            .memberships
            .values()
            .filter(|membership| {
                membership.team_id() == team_id
                    && membership.is_active()
                    && membership.is_project_manager()
            })
            .map(TeamMembership::user_id)
            .collect();
        Ok(managers)
    }

    async fn insert_reset_token(
        &self,
        token: &PasswordResetToken,
    ) -> DirectoryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        state.reset_tokens.insert(token.id(), token.clone());
        Ok(())
    }

    async fn find_reset_token(
        &self,
        id: Uuid,
    ) -> DirectoryRepositoryResult<Option<PasswordResetToken>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.reset_tokens.get(&id).cloned())
    }

    async fn update_reset_token(
        &self,
        token: &PasswordResetToken,
    ) -> DirectoryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.reset_tokens.contains_key(&token.id()) {
            return Err(DirectoryRepositoryError::ResetTokenNotFound(token.id()));
        }
        state.reset_tokens.insert(token.id(), token.clone());
        Ok(())
    }
}
