//! Shared world state for task validation BDD scenarios.

use std::sync::Arc;

use chantier::directory::{
    adapters::memory::InMemoryDirectoryRepository,
    domain::{CapabilitySet, User},
    services::RosterService,
};
use chantier::workflow::{
    adapters::memory::InMemoryWorkflowStore,
    domain::{Project, ProjectTask},
    services::{ProjectService, TaskWorkflowService, WorkflowConfig, WorkflowError},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Roster service type used by the BDD world.
pub type WorldRoster = RosterService<InMemoryDirectoryRepository, DefaultClock>;
/// Engine type used by the BDD world.
pub type WorldEngine =
    TaskWorkflowService<InMemoryWorkflowStore, InMemoryDirectoryRepository, DefaultClock>;
/// Project service type used by the BDD world.
pub type WorldProjects =
    ProjectService<InMemoryWorkflowStore, InMemoryDirectoryRepository, DefaultClock>;

/// Scenario world for task validation behaviour tests.
pub struct TaskValidationWorld {
    pub store: Arc<InMemoryWorkflowStore>,
    pub roster: WorldRoster,
    pub engine: WorldEngine,
    pub projects: WorldProjects,
    pub developer: Option<(User, CapabilitySet)>,
    pub manager: Option<(User, CapabilitySet)>,
    pub project: Option<Project>,
    pub task: Option<ProjectTask>,
    pub last_result: Option<Result<ProjectTask, WorkflowError>>,
}

impl TaskValidationWorld {
    /// Creates a world over fresh in-memory adapters.
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
            store,
            developer: None,
            manager: None,
            project: None,
            task: None,
            last_result: None,
        }
    }

    /// Returns the seeded developer capability set.
    pub fn developer_caps(&self) -> eyre::Result<&CapabilitySet> {
        self.developer
            .as_ref()
            .map(|(_, caps)| caps)
            .ok_or_else(|| eyre::eyre!("missing developer in scenario world"))
    }

    /// Returns the seeded manager capability set.
    pub fn manager_caps(&self) -> eyre::Result<&CapabilitySet> {
        self.manager
            .as_ref()
            .map(|(_, caps)| caps)
            .ok_or_else(|| eyre::eyre!("missing project manager in scenario world"))
    }

    /// Returns the seeded task.
    pub fn current_task(&self) -> eyre::Result<&ProjectTask> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for TaskValidationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskValidationWorld {
    TaskValidationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
