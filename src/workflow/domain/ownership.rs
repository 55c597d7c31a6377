//! Declarative ownership table and the deletion-authorization routine.
//!
//! The original data model expressed its foreign-key delete behaviour
//! imperatively, scattered across handlers. Here every owner/dependent
//! relation is declared once with its policy, and a single routine decides
//! whether a deletion may proceed and what it must cascade to.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Entity categories participating in ownership relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// User account.
    User,
    /// Team.
    Team,
    /// Membership join row.
    TeamMembership,
    /// Project.
    Project,
    /// Project task.
    ProjectTask,
    /// Task comment.
    Comment,
    /// Notification row.
    Notification,
    /// Uploaded project document record.
    ProjectDocument,
}

impl EntityKind {
    /// Returns the canonical name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Team => "team",
            Self::TeamMembership => "team_membership",
            Self::Project => "project",
            Self::ProjectTask => "project_task",
            Self::Comment => "comment",
            Self::Notification => "notification",
            Self::ProjectDocument => "project_document",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deletion propagation policy on one owner/dependent relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Deleting the owner removes its dependents.
    Cascade,
    /// The owner cannot be deleted while dependents exist.
    Restrict,
}

/// One declared owner/dependent relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipRelation {
    /// Entity whose deletion is being considered.
    pub owner: EntityKind,
    /// Entity referencing the owner.
    pub dependent: EntityKind,
    /// Propagation policy for the relation.
    pub policy: DeletePolicy,
}

const RELATIONS: &[OwnershipRelation] = &[
    OwnershipRelation {
        owner: EntityKind::Project,
        dependent: EntityKind::ProjectTask,
        policy: DeletePolicy::Cascade,
    },
    OwnershipRelation {
        owner: EntityKind::Project,
        dependent: EntityKind::ProjectDocument,
        policy: DeletePolicy::Cascade,
    },
    OwnershipRelation {
        owner: EntityKind::ProjectTask,
        dependent: EntityKind::Comment,
        policy: DeletePolicy::Cascade,
    },
    OwnershipRelation {
        owner: EntityKind::Team,
        dependent: EntityKind::TeamMembership,
        policy: DeletePolicy::Cascade,
    },
    OwnershipRelation {
        owner: EntityKind::Team,
        dependent: EntityKind::Project,
        policy: DeletePolicy::Restrict,
    },
    OwnershipRelation {
        owner: EntityKind::User,
        dependent: EntityKind::Notification,
        policy: DeletePolicy::Cascade,
    },
    OwnershipRelation {
        owner: EntityKind::User,
        dependent: EntityKind::TeamMembership,
        policy: DeletePolicy::Cascade,
    },
    OwnershipRelation {
        owner: EntityKind::User,
        dependent: EntityKind::Project,
        policy: DeletePolicy::Restrict,
    },
    OwnershipRelation {
        owner: EntityKind::User,
        dependent: EntityKind::ProjectTask,
        policy: DeletePolicy::Restrict,
    },
];

/// Returns the declared relations for one owner kind.
#[must_use]
pub fn ownership_relations(owner: EntityKind) -> Vec<OwnershipRelation> {
    RELATIONS
        .iter()
        .copied()
        .filter(|relation| relation.owner == owner)
        .collect()
}

/// Live dependent counts gathered by the caller before authorizing.
///
/// Kinds absent from the map are treated as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependentCounts(HashMap<EntityKind, u64>);

impl DependentCounts {
    /// Creates an empty count set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the live count for one dependent kind.
    #[must_use]
    pub fn with(mut self, kind: EntityKind, count: u64) -> Self {
        self.0.insert(kind, count);
        self
    }

    /// Returns the recorded count for one kind, defaulting to zero.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }
}

/// Cascade targets an authorized deletion must remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPlan {
    /// Entity being deleted.
    pub owner: EntityKind,
    /// Dependent kinds the deletion cascades to, in declaration order.
    pub cascades: Vec<EntityKind>,
}

/// Error raised when a restricted relation still has live dependents.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot delete {owner} while {count} {dependent} rows reference it")]
pub struct DeletionBlocked {
    /// Entity whose deletion was refused.
    pub owner: EntityKind,
    /// Dependent kind blocking the deletion.
    pub dependent: EntityKind,
    /// Number of live dependents.
    pub count: u64,
}

/// Decides whether deleting `owner` may proceed.
///
/// Restricted relations are checked against the supplied live counts; the
/// first violation refuses the whole deletion. On success the plan lists
/// every cascade target in declaration order.
///
/// # Errors
///
/// Returns [`DeletionBlocked`] for the first restricted relation with a
/// non-zero dependent count.
pub fn authorize_deletion(
    owner: EntityKind,
    counts: &DependentCounts,
) -> Result<DeletionPlan, DeletionBlocked> {
    let mut cascades = Vec::new();
    for relation in RELATIONS.iter().filter(|relation| relation.owner == owner) {
        match relation.policy {
            DeletePolicy::Cascade => cascades.push(relation.dependent),
            DeletePolicy::Restrict => {
                let count = counts.count(relation.dependent);
                if count > 0 {
                    return Err(DeletionBlocked {
                        owner,
                        dependent: relation.dependent,
                        count,
                    });
                }
            }
        }
    }
    Ok(DeletionPlan { owner, cascades })
}
