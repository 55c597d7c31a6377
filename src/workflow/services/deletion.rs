//! Deletion flows driven by the declarative ownership table.
//!
//! Every deletion passes through [`authorize_deletion`]: restricted
//! relations are checked against live dependent counts gathered from the
//! stores, and only an authorized plan is executed.

use crate::directory::domain::{Capability, CapabilitySet, TeamId, UserId};
use crate::directory::ports::{DirectoryRepository, DirectoryRepositoryError};
use crate::workflow::domain::{
    DeletionBlocked, DependentCounts, EntityKind, ProjectId, authorize_deletion,
};
use crate::workflow::ports::{CascadeReport, WorkflowStore, WorkflowStoreError};
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for deletion operations.
#[derive(Debug, Error)]
pub enum DeletionError {
    /// The caller lacks the authority the deletion requires.
    #[error("user {user_id} may not {action}")]
    Forbidden {
        /// Caller whose request was refused.
        user_id: UserId,
        /// Operation that was refused.
        action: &'static str,
    },

    /// A restricted relation still has live dependents.
    #[error(transparent)]
    Blocked(#[from] DeletionBlocked),

    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Directory operation failed.
    #[error(transparent)]
    Directory(#[from] DirectoryRepositoryError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] WorkflowStoreError),
}

/// Result type for deletion operations.
pub type DeletionResult<T> = Result<T, DeletionError>;

/// Deletion orchestration service across both stores.
#[derive(Clone)]
pub struct DeletionService<S, D>
where
    S: WorkflowStore,
    D: DirectoryRepository,
{
    store: Arc<S>,
    directory: Arc<D>,
}

impl<S, D> DeletionService<S, D>
where
    S: WorkflowStore,
    D: DirectoryRepository,
{
    /// Creates a new deletion service.
    #[must_use]
    pub const fn new(store: Arc<S>, directory: Arc<D>) -> Self {
        Self { store, directory }
    }

    /// Deletes a project, cascading its tasks, their comments, and its
    /// document records.
    ///
    /// # Errors
    ///
    /// Returns [`DeletionError::Forbidden`] without task-management or
    /// roster authority, or [`DeletionError::ProjectNotFound`] when the
    /// project is absent.
    pub async fn delete_project(
        &self,
        project_id: ProjectId,
        caller: &CapabilitySet,
    ) -> DeletionResult<CascadeReport> {
        let project = self
            .store
            .find_project(project_id)
            .await?
            .ok_or(DeletionError::ProjectNotFound(project_id))?;
        let authorized = caller.can_manage_tasks(project.team_id())
            || caller.allows(&Capability::ManageRoster);
        if !authorized {
            return Err(DeletionError::Forbidden {
                user_id: caller.user_id(),
                action: "delete this project",
            });
        }

        // Projects declare no restricted dependents, so the plan always
        // authorizes; the call keeps every deletion on the same path.
        let plan = authorize_deletion(EntityKind::Project, &DependentCounts::new())?;
        let report = self.store.delete_project(project_id).await?;
        tracing::debug!(
            project = %project_id,
            cascades = plan.cascades.len(),
            tasks = report.tasks,
            comments = report.comments,
            documents = report.documents,
            "deleted project",
        );
        Ok(report)
    }

    /// Deletes a team, cascading its membership rows.
    ///
    /// # Errors
    ///
    /// Returns [`DeletionError::Forbidden`] without roster authority, or
    /// [`DeletionError::Blocked`] while the team still owns projects.
    pub async fn delete_team(
        &self,
        team_id: TeamId,
        caller: &CapabilitySet,
    ) -> DeletionResult<u64> {
        Self::require_roster_authority(caller, "delete teams")?;
        let counts = DependentCounts::new().with(
            EntityKind::Project,
            self.store.count_projects_for_team(team_id).await?,
        );
        let plan = authorize_deletion(EntityKind::Team, &counts)?;
        let cascaded = self.directory.delete_team(team_id).await?;
        tracing::debug!(
            team = %team_id,
            cascades = plan.cascades.len(),
            memberships = cascaded,
            "deleted team",
        );
        Ok(cascaded)
    }

    /// Deletes a user, cascading their notifications and membership rows.
    ///
    /// # Errors
    ///
    /// Returns [`DeletionError::Forbidden`] without roster authority, or
    /// [`DeletionError::Blocked`] while tasks or projects still reference
    /// the user.
    pub async fn delete_user(
        &self,
        user_id: UserId,
        caller: &CapabilitySet,
    ) -> DeletionResult<u64> {
        Self::require_roster_authority(caller, "delete users")?;
        let counts = DependentCounts::new()
            .with(
                EntityKind::ProjectTask,
                self.store.count_tasks_referencing_user(user_id).await?,
            )
            .with(
                EntityKind::Project,
                self.store.count_projects_referencing_user(user_id).await?,
            );
        authorize_deletion(EntityKind::User, &counts)?;

        let notifications = self.store.delete_notifications_for_user(user_id).await?;
        let memberships = self.directory.delete_user(user_id).await?;
        tracing::debug!(
            user = %user_id,
            notifications,
            memberships,
            "deleted user",
        );
        Ok(notifications + memberships)
    }

    fn require_roster_authority(
        caller: &CapabilitySet,
        action: &'static str,
    ) -> DeletionResult<()> {
        if caller.allows(&Capability::ManageRoster) {
            Ok(())
        } else {
            Err(DeletionError::Forbidden {
                user_id: caller.user_id(),
                action,
            })
        }
    }
}
