//! Shared test helpers for in-memory adapter integration tests.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use chantier::directory::{
    adapters::memory::InMemoryDirectoryRepository,
    domain::{CapabilitySet, Role, Team, User},
    services::{AddMemberRequest, RegisterUserRequest, RosterService},
};
use chantier::workflow::{
    adapters::memory::InMemoryWorkflowStore,
    domain::{Priority, Project, ProjectTask},
    services::{
        CreateProjectRequest, CreateTaskRequest, DeletionService, ProjectService,
        TaskWorkflowService, UpdateProgressRequest, WorkflowConfig,
    },
};
use chrono::NaiveDate;
use mockable::DefaultClock;
use std::sync::Arc;

/// Directory repository type shared by the in-memory suite.
pub type TestDirectory = InMemoryDirectoryRepository;
/// Workflow store type shared by the in-memory suite.
pub type TestStore = InMemoryWorkflowStore;
/// Roster service type shared by the in-memory suite.
pub type TestRoster = RosterService<TestDirectory, DefaultClock>;
/// Workflow engine type shared by the in-memory suite.
pub type TestEngine = TaskWorkflowService<TestStore, TestDirectory, DefaultClock>;
/// Project service type shared by the in-memory suite.
pub type TestProjects = ProjectService<TestStore, TestDirectory, DefaultClock>;
/// Deletion service type shared by the in-memory suite.
pub type TestDeletion = DeletionService<TestStore, TestDirectory>;

/// Fully wired application context over the in-memory adapters.
pub struct TestContext {
    /// Directory repository handle, for direct row inspection.
    pub directory: Arc<TestDirectory>,
    /// Workflow store handle, for direct row inspection.
    pub store: Arc<TestStore>,
    /// Roster service.
    pub roster: TestRoster,
    /// Workflow engine.
    pub engine: TestEngine,
    /// Project service.
    pub projects: TestProjects,
    /// Deletion service.
    pub deletion: TestDeletion,
}

impl TestContext {
    /// Wires every service over fresh in-memory adapters.
    #[must_use]
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryDirectoryRepository::new());
        let store = Arc::new(InMemoryWorkflowStore::new());
        let clock = Arc::new(DefaultClock);
        Self {
            roster: RosterService::new(Arc::clone(&directory), Arc::clone(&clock)),
            engine: TaskWorkflowService::new(
                Arc::clone(&store),
                Arc::clone(&directory),
                Arc::clone(&clock),
                WorkflowConfig::default(),
            ),
            projects: ProjectService::new(
                Arc::clone(&store),
                Arc::clone(&directory),
                Arc::clone(&clock),
            ),
            deletion: DeletionService::new(Arc::clone(&store), Arc::clone(&directory)),
            directory,
            store,
        }
    }

    /// Registers a user and resolves their capability set.
    pub async fn user_with_capabilities(
        &self,
        name: &str,
        role: Role,
    ) -> (User, CapabilitySet) {
        let user = self
            .roster
            .register_user(RegisterUserRequest::new(
                name,
                format!("{name}@example.com"),
                "hash",
                role,
            ))
            .await
            .expect("registration should succeed");
        let caps = self
            .roster
            .capabilities_for(user.id())
            .await
            .expect("capability resolution should succeed");
        (user, caps)
    }

    /// Re-resolves a capability set after membership changes.
    pub async fn refreshed_capabilities(&self, user: &User) -> CapabilitySet {
        self.roster
            .capabilities_for(user.id())
            .await
            .expect("capability resolution should succeed")
    }

    /// Creates a team with one developer and one project-manager member,
    /// returning `(team, developer, developer caps, manager, manager caps)`.
    pub async fn seeded_team(&self) -> (Team, User, CapabilitySet, User, CapabilitySet) {
        let (developer, _) = self.user_with_capabilities("dev", Role::Developer).await;
        let (manager, _) = self
            .user_with_capabilities("pm", Role::ProjectManager)
            .await;
        let team = self.roster.create_team("Platform").await.expect("team");
        self.roster
            .add_member(AddMemberRequest::new(team.id(), developer.id()))
            .await
            .expect("developer membership");
        self.roster
            .add_member(AddMemberRequest::new(team.id(), manager.id()).as_project_manager())
            .await
            .expect("manager membership");
        let developer_caps = self.refreshed_capabilities(&developer).await;
        let manager_caps = self.refreshed_capabilities(&manager).await;
        (team, developer, developer_caps, manager, manager_caps)
    }

    /// Creates a project in the given team on behalf of the manager.
    pub async fn seeded_project(&self, team: &Team, manager: &CapabilitySet) -> Project {
        self.projects
            .create_project(
                CreateProjectRequest::new(
                    team.id(),
                    "Data Platform",
                    date(2026, 7, 1),
                    date(2026, 12, 31),
                    Priority::High,
                ),
                manager,
            )
            .await
            .expect("project creation should succeed")
    }

    /// Creates a task assigned to the developer.
    pub async fn seeded_task(
        &self,
        project: &Project,
        manager: &CapabilitySet,
        assignee: &User,
    ) -> ProjectTask {
        self.engine
            .create_task(
                CreateTaskRequest::new(
                    project.id(),
                    "Ship the importer",
                    date(2026, 9, 30),
                    Priority::Medium,
                )
                .with_assignee(assignee.id()),
                manager,
            )
            .await
            .expect("task creation should succeed")
    }

    /// Drives a task to awaiting-validation through its assignee.
    pub async fn submit_task(
        &self,
        task: &ProjectTask,
        assignee: &CapabilitySet,
    ) -> ProjectTask {
        self.engine
            .update_progress(UpdateProgressRequest::new(task.id(), 100), assignee)
            .await
            .expect("submission should succeed")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a calendar date, panicking on invalid input.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}
