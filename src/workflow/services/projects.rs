//! Service layer for project lifecycle and document records.

use crate::directory::domain::{Capability, CapabilitySet, TeamId, UserId};
use crate::directory::ports::DirectoryRepository;
use crate::workflow::domain::{
    ContentDigest, FileName, NotificationKind, Priority, Project, ProjectDocument, ProjectId,
    ProjectName, ProjectSchedule, ProjectStatus,
};
use crate::workflow::domain::Notification;
use crate::workflow::ports::WorkflowStore;
use crate::workflow::services::engine::{WorkflowError, WorkflowResult};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    team_id: TeamId,
    name: String,
    starts_on: NaiveDate,
    ends_on: NaiveDate,
    priority: Priority,
    manager: Option<UserId>,
}

impl CreateProjectRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(
        team_id: TeamId,
        name: impl Into<String>,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        priority: Priority,
    ) -> Self {
        Self {
            team_id,
            name: name.into(),
            starts_on,
            ends_on,
            priority,
            manager: None,
        }
    }

    /// Assigns a project manager on creation.
    #[must_use]
    pub const fn with_manager(mut self, manager: UserId) -> Self {
        self.manager = Some(manager);
        self
    }
}

/// Request payload for registering an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDocumentRequest {
    project_id: ProjectId,
    file_name: String,
    content: Vec<u8>,
}

impl RegisterDocumentRequest {
    /// Creates a registration request for uploaded content.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            project_id,
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Project orchestration service.
#[derive(Clone)]
pub struct ProjectService<S, D, C>
where
    S: WorkflowStore,
    D: DirectoryRepository,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<S, D, C> ProjectService<S, D, C>
where
    S: WorkflowStore,
    D: DirectoryRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(store: Arc<S>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            store,
            directory,
            clock,
        }
    }

    /// Creates a project owned by a team.
    ///
    /// Requires task-management authority for the team or roster authority.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when the caller lacks authority, the name
    /// or schedule is invalid, the manager is unknown, or persistence fails.
    pub async fn create_project(
        &self,
        request: CreateProjectRequest,
        caller: &CapabilitySet,
    ) -> WorkflowResult<Project> {
        Self::require_team_authority(request.team_id, caller, "create projects for this team")?;
        let name = ProjectName::new(request.name)?;
        let schedule = ProjectSchedule::new(request.starts_on, request.ends_on)?;
        let mut project = Project::new(
            name,
            schedule,
            request.priority,
            request.team_id,
            caller.user_id(),
            &*self.clock,
        );
        if let Some(manager) = request.manager {
            self.require_known_user(manager).await?;
            project.assign_manager(manager, &*self.clock);
        }
        self.store.insert_project(&project).await?;
        tracing::debug!(project = %project.id(), team = %request.team_id, "created project");
        Ok(project)
    }

    /// Assigns a project manager, notifying them.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when the project or user is unknown, or the
    /// caller lacks authority.
    pub async fn assign_manager(
        &self,
        project_id: ProjectId,
        manager: UserId,
        caller: &CapabilitySet,
    ) -> WorkflowResult<Project> {
        let mut project = self.load_project(project_id).await?;
        Self::require_team_authority(project.team_id(), caller, "assign a project manager")?;
        self.require_known_user(manager).await?;

        project.assign_manager(manager, &*self.clock);
        self.store.update_project(&project).await?;

        let body = format!(
            "You are now managing the project \"{}\"",
            project.name().as_str(),
        );
        let notification = Notification::new(manager, NotificationKind::Info, body, &*self.clock)
            .with_project(project.id())
            .with_actor(caller.user_id());
        self.store.insert_notification(&notification).await?;
        Ok(project)
    }

    /// Changes a project's lifecycle status without cancellation semantics.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when the project is unknown or the caller
    /// lacks authority.
    pub async fn set_status(
        &self,
        project_id: ProjectId,
        status: ProjectStatus,
        caller: &CapabilitySet,
    ) -> WorkflowResult<Project> {
        let mut project = self.load_project(project_id).await?;
        Self::require_team_authority(project.team_id(), caller, "change project status")?;
        project.set_status(status, &*self.clock);
        self.store.update_project(&project).await?;
        Ok(project)
    }

    /// Cancels a project, stamping the cancellation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when the project is unknown, already
    /// cancelled, or the caller lacks authority.
    pub async fn cancel_project(
        &self,
        project_id: ProjectId,
        caller: &CapabilitySet,
    ) -> WorkflowResult<Project> {
        let mut project = self.load_project(project_id).await?;
        Self::require_team_authority(project.team_id(), caller, "cancel this project")?;
        project.cancel(&*self.clock)?;
        self.store.update_project(&project).await?;
        tracing::debug!(project = %project.id(), "cancelled project");
        Ok(project)
    }

    /// Records an uploaded document for a project.
    ///
    /// Only the record is stored; the blob itself lives in external storage.
    /// The digest and size are computed from the uploaded content.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when the project is unknown, the file name
    /// is invalid, or the caller lacks authority.
    pub async fn register_document(
        &self,
        request: RegisterDocumentRequest,
        caller: &CapabilitySet,
    ) -> WorkflowResult<ProjectDocument> {
        let project = self.load_project(request.project_id).await?;
        Self::require_team_authority(project.team_id(), caller, "upload project documents")?;
        let file_name = FileName::new(request.file_name)?;
        let digest = ContentDigest::of(&request.content);
        let size_bytes = u64::try_from(request.content.len()).unwrap_or(u64::MAX);
        let document = ProjectDocument::new(
            project.id(),
            file_name,
            size_bytes,
            digest,
            caller.user_id(),
            &*self.clock,
        );
        self.store.insert_document(&document).await?;
        Ok(document)
    }

    /// Returns the document records of one project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::ProjectNotFound`] when the project is
    /// absent.
    pub async fn documents_for_project(
        &self,
        project_id: ProjectId,
    ) -> WorkflowResult<Vec<ProjectDocument>> {
        let project = self.load_project(project_id).await?;
        Ok(self.store.documents_for_project(project.id()).await?)
    }

    async fn load_project(&self, project_id: ProjectId) -> WorkflowResult<Project> {
        self.store
            .find_project(project_id)
            .await?
            .ok_or(WorkflowError::ProjectNotFound(project_id))
    }

    async fn require_known_user(&self, user_id: UserId) -> WorkflowResult<()> {
        self.directory
            .find_user(user_id)
            .await?
            .map(|_| ())
            .ok_or(WorkflowError::UnknownUser(user_id))
    }

    fn require_team_authority(
        team_id: TeamId,
        caller: &CapabilitySet,
        action: &'static str,
    ) -> WorkflowResult<()> {
        if caller.can_manage_tasks(team_id) || caller.allows(&Capability::ManageRoster) {
            Ok(())
        } else {
            Err(WorkflowError::Forbidden {
                user_id: caller.user_id(),
                action,
            })
        }
    }
}
