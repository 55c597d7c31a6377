//! Given steps for task validation BDD scenarios.

use super::world::{TaskValidationWorld, run_async};
use chantier::directory::domain::Role;
use chantier::directory::services::{AddMemberRequest, RegisterUserRequest};
use chantier::workflow::domain::Priority;
use chantier::workflow::services::{
    CreateProjectRequest, CreateTaskRequest, UpdateProgressRequest,
};
use chrono::NaiveDate;
use eyre::WrapErr;
use rstest_bdd_macros::given;

fn date(year: i32, month: u32, day: u32) -> eyre::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| eyre::eyre!("invalid date"))
}

#[given("a team with a developer and a project manager")]
fn team_with_members(world: &mut TaskValidationWorld) -> Result<(), eyre::Report> {
    let developer = run_async(world.roster.register_user(RegisterUserRequest::new(
        "dev",
        "dev@example.com",
        "hash",
        Role::Developer,
    )))
    .wrap_err("register developer")?;
    let manager = run_async(world.roster.register_user(RegisterUserRequest::new(
        "pm",
        "pm@example.com",
        "hash",
        Role::ProjectManager,
    )))
    .wrap_err("register project manager")?;
    let team = run_async(world.roster.create_team("Platform")).wrap_err("create team")?;
    run_async(
        world
            .roster
            .add_member(AddMemberRequest::new(team.id(), developer.id())),
    )
    .wrap_err("developer membership")?;
    run_async(
        world
            .roster
            .add_member(AddMemberRequest::new(team.id(), manager.id()).as_project_manager()),
    )
    .wrap_err("manager membership")?;

    let developer_caps =
        run_async(world.roster.capabilities_for(developer.id())).wrap_err("developer caps")?;
    let manager_caps =
        run_async(world.roster.capabilities_for(manager.id())).wrap_err("manager caps")?;
    world.developer = Some((developer, developer_caps));
    world.manager = Some((manager, manager_caps));
    Ok(())
}

#[given("a project owned by the team")]
fn project_owned_by_team(world: &mut TaskValidationWorld) -> Result<(), eyre::Report> {
    let manager_caps = world.manager_caps()?.clone();
    let team_id = manager_caps
        .managed_teams()
        .first()
        .copied()
        .ok_or_else(|| eyre::eyre!("manager has no managed team"))?;
    let project = run_async(world.projects.create_project(
        CreateProjectRequest::new(
            team_id,
            "Data Platform",
            date(2026, 7, 1)?,
            date(2026, 12, 31)?,
            Priority::High,
        ),
        &manager_caps,
    ))
    .wrap_err("create project")?;
    world.project = Some(project);
    Ok(())
}

#[given("a task assigned to the developer")]
fn task_assigned_to_developer(world: &mut TaskValidationWorld) -> Result<(), eyre::Report> {
    let manager_caps = world.manager_caps()?.clone();
    let developer_id = world
        .developer
        .as_ref()
        .map(|(user, _)| user.id())
        .ok_or_else(|| eyre::eyre!("missing developer"))?;
    let project = world
        .project
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing project"))?;
    let task = run_async(world.engine.create_task(
        CreateTaskRequest::new(
            project.id(),
            "Ship the importer",
            date(2026, 9, 30)?,
            Priority::Medium,
        )
        .with_assignee(developer_id),
        &manager_caps,
    ))
    .wrap_err("create task")?;
    world.task = Some(task);
    Ok(())
}

#[given("the developer has submitted the task")]
fn developer_has_submitted(world: &mut TaskValidationWorld) -> Result<(), eyre::Report> {
    let developer_caps = world.developer_caps()?.clone();
    let task_id = world.current_task()?.id();
    let submitted = run_async(
        world
            .engine
            .update_progress(UpdateProgressRequest::new(task_id, 100), &developer_caps),
    )
    .wrap_err("submit task")?;
    world.task = Some(submitted);
    Ok(())
}
