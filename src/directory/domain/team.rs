//! Team aggregate and the membership join row scoping PM authority.

use super::{DirectoryDomainError, TeamId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated team display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamName(String);

impl TeamName {
    const MAX_LENGTH: usize = 100;

    /// Creates a validated team name.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::InvalidTeamName`] when the value is
    /// empty after trimming or exceeds 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() || normalized.chars().count() > Self::MAX_LENGTH {
            return Err(DirectoryDomainError::InvalidTeamName(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TeamName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: TeamName,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new active team.
    #[must_use]
    pub fn new(name: TeamName, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TeamId::new(),
            name,
            active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a team from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: TeamId,
        name: TeamName,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            active,
            created_at,
            updated_at,
        }
    }

    /// Returns the team identifier.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Returns the team name.
    #[must_use]
    pub const fn name(&self) -> &TeamName {
        &self.name
    }

    /// Returns whether the team is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
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

    /// Deactivates the team.
    pub fn deactivate(&mut self, clock: &impl Clock) {
        self.active = false;
        self.updated_at = clock.utc();
    }
}

/// Membership join row with composite identity `(team, user)`.
///
/// The project-manager flag scopes validation authority to this team; the
/// active flag soft-removes the member without losing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    team_id: TeamId,
    user_id: UserId,
    project_manager: bool,
    active: bool,
    joined_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TeamMembership {
    /// Creates a new active membership.
    #[must_use]
    pub fn new(team_id: TeamId, user_id: UserId, project_manager: bool, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            team_id,
            user_id,
            project_manager,
            active: true,
            joined_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a membership from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        team_id: TeamId,
        user_id: UserId,
        project_manager: bool,
        active: bool,
        joined_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            team_id,
            user_id,
            project_manager,
            active,
            joined_at,
            updated_at,
        }
    }

    /// Returns the team side of the composite identity.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the user side of the composite identity.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns whether this membership carries project-manager authority.
    #[must_use]
    pub const fn is_project_manager(&self) -> bool {
        self.project_manager
    }

    /// Returns whether the membership is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the join timestamp.
    #[must_use]
    pub const fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Grants project-manager authority within this team.
    pub fn grant_project_manager(&mut self, clock: &impl Clock) {
        self.project_manager = true;
        self.touch(clock);
    }

    /// Revokes project-manager authority within this team.
    pub fn revoke_project_manager(&mut self, clock: &impl Clock) {
        self.project_manager = false;
        self.touch(clock);
    }

    /// Soft-removes the member from the team.
    pub fn deactivate(&mut self, clock: &impl Clock) {
        self.active = false;
        self.touch(clock);
    }

    /// Restores a soft-removed membership.
    pub fn reactivate(&mut self, clock: &impl Clock) {
        self.active = true;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
