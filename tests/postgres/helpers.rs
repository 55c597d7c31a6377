//! Shared test helpers for `PostgreSQL` integration tests.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use super::cluster::{BoxError, TemporaryDatabase, shared_cluster};
use chantier::directory::adapters::postgres::PostgresDirectoryRepository;
use chantier::directory::domain::{Role, Team, TeamMembership, TeamName, User, UserName};
use chantier::directory::domain::{EmailAddress, PersistedUserData, UserId};
use chantier::directory::ports::DirectoryRepository;
use chantier::workflow::adapters::postgres::PostgresWorkflowStore;
use chantier::workflow::domain::{
    Priority, Project, ProjectName, ProjectSchedule, ProjectTask, TaskName,
};
use chantier::workflow::ports::WorkflowStore;
use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::{Clock, DefaultClock};

/// SQL creating the directory tables.
pub const DIRECTORY_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-07-14-000000_create_directory_tables/up.sql");

/// SQL creating the workflow tables.
pub const WORKFLOW_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-07-14-000001_create_workflow_tables/up.sql");

/// Applies the crate's migrations to the database at the given URL.
pub fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut conn = PgConnection::establish(url).map_err(|err| Box::new(err) as BoxError)?;
    conn.batch_execute(DIRECTORY_SCHEMA_SQL)
        .map_err(|err| Box::new(err) as BoxError)?;
    conn.batch_execute(WORKFLOW_SCHEMA_SQL)
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(())
}

/// Adapters over one freshly cloned test database.
pub struct PgHarness {
    /// Keeps the database alive for the duration of the test.
    pub database: TemporaryDatabase,
    /// Directory repository over the database.
    pub directory: PostgresDirectoryRepository,
    /// Workflow store over the database.
    pub store: PostgresWorkflowStore,
}

/// Boots the shared cluster and clones a migrated database for one test.
#[must_use]
pub fn pg_harness() -> PgHarness {
    let cluster = shared_cluster();
    cluster
        .ensure_template(apply_migrations)
        .expect("template migration should succeed");
    let database = cluster
        .create_database_from_template()
        .expect("test database should clone from template");

    let manager = ConnectionManager::<PgConnection>::new(database.url());
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .expect("pool should build");

    PgHarness {
        directory: PostgresDirectoryRepository::new(pool.clone()),
        store: PostgresWorkflowStore::new(pool),
        database,
    }
}

/// Builds a calendar date, panicking on invalid input.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Builds a user aggregate with a unique name and email.
#[must_use]
pub fn sample_user(name: &str, role: Role) -> User {
    User::from_persisted(PersistedUserData {
        id: UserId::new(),
        name: UserName::new(name).expect("valid name"),
        email: EmailAddress::new(format!("{name}@example.com")).expect("valid email"),
        credential_hash: "hash".to_owned(),
        role,
        active: true,
        must_change_password: false,
        created_at: DefaultClock.utc(),
        updated_at: DefaultClock.utc(),
    })
}

/// Persists a user, team, membership, and project, returning the seeded rows.
pub async fn seed_project(harness: &PgHarness) -> (User, Team, Project) {
    let clock = DefaultClock;
    let creator = sample_user("creator", Role::ProjectManager);
    harness
        .directory
        .insert_user(&creator)
        .await
        .expect("user insert");

    let team = Team::new(TeamName::new("Platform").expect("valid name"), &clock);
    harness
        .directory
        .insert_team(&team)
        .await
        .expect("team insert");
    harness
        .directory
        .insert_membership(&TeamMembership::new(team.id(), creator.id(), true, &clock))
        .await
        .expect("membership insert");

    let project = Project::new(
        ProjectName::new("Data Platform").expect("valid name"),
        ProjectSchedule::new(date(2026, 7, 1), date(2026, 12, 31)).expect("valid schedule"),
        Priority::High,
        team.id(),
        creator.id(),
        &clock,
    );
    harness
        .store
        .insert_project(&project)
        .await
        .expect("project insert");

    (creator, team, project)
}

/// Persists a task in the given project assigned to `assignee`.
pub async fn seed_task(harness: &PgHarness, project: &Project, assignee: &User) -> ProjectTask {
    let clock = DefaultClock;
    let task = ProjectTask::new(
        project.id(),
        TaskName::new("Ship the importer").expect("valid name"),
        date(2026, 9, 30),
        Priority::Medium,
        Some(assignee.id()),
        assignee.id(),
        &clock,
    );
    harness.store.insert_task(&task).await.expect("task insert");
    task
}
