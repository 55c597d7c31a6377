//! Capability-set model for per-request authority resolution.
//!
//! Each workflow operation declares the capability it requires; role and
//! membership resolution produces a [`CapabilitySet`] once per request, and
//! the engine never inspects raw role strings.

use super::{Role, TeamId, UserId, UserName};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single grant a caller may hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Capability {
    /// Record progress on tasks assigned to the caller.
    EditAssignedTask,
    /// Attach comments to tasks.
    CommentOnTask,
    /// Create, assign, validate, and reject tasks for one team's projects.
    ManageTasks {
        /// Team whose projects the grant covers.
        team_id: TeamId,
    },
    /// Administer users, teams, and memberships.
    ManageRoster,
    /// Read reporting aggregates across teams.
    ViewReports,
}

/// Resolved caller identity and grants for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    user_id: UserId,
    user_name: UserName,
    role: Role,
    grants: HashSet<Capability>,
}

impl CapabilitySet {
    /// Creates a capability set from resolved grants.
    #[must_use]
    pub fn new(
        user_id: UserId,
        user_name: UserName,
        role: Role,
        grants: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            user_id,
            user_name,
            role,
            grants: grants.into_iter().collect(),
        }
    }

    /// Returns the caller's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the caller's account name, used when rendering notifications.
    #[must_use]
    pub const fn user_name(&self) -> &UserName {
        &self.user_name
    }

    /// Returns the caller's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns whether the caller holds the given grant.
    #[must_use]
    pub fn allows(&self, capability: &Capability) -> bool {
        self.grants.contains(capability)
    }

    /// Returns whether the caller may manage tasks for the given team.
    #[must_use]
    pub fn can_manage_tasks(&self, team_id: TeamId) -> bool {
        self.grants.contains(&Capability::ManageTasks { team_id })
    }

    /// Returns the teams for which the caller holds task-management grants.
    #[must_use]
    pub fn managed_teams(&self) -> Vec<TeamId> {
        self.grants
            .iter()
            .filter_map(|grant| match grant {
                Capability::ManageTasks { team_id } => Some(*team_id),
                _ => None,
            })
            .collect()
    }
}
