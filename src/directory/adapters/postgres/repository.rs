//! `PostgreSQL` repository implementation for directory storage.

use super::{
    models::{PasswordResetTokenRow, TeamMemberRow, TeamRow, UserRow},
    schema::{password_reset_tokens, team_members, teams, users},
};
use crate::directory::{
    domain::{
        EmailAddress, PasswordResetToken, PersistedUserData, Role, Team, TeamId, TeamMembership,
        TeamName, User, UserId, UserName,
    },
    ports::{DirectoryRepository, DirectoryRepositoryError, DirectoryRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by directory adapters.
pub type DirectoryPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed directory repository.
#[derive(Debug, Clone)]
pub struct PostgresDirectoryRepository {
    pool: DirectoryPgPool,
}

impl PostgresDirectoryRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DirectoryPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> DirectoryRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DirectoryRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(DirectoryRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(DirectoryRepositoryError::persistence)?
    }
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    async fn insert_user(&self, user: &User) -> DirectoryRepositoryResult<()> {
        let row = user_to_row(user);
        let user_id = user.id();
        let name = user.name().clone();
        let email = user.email().clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_constraint(info.as_ref(), "users_user_name_key") =>
                    {
                        DirectoryRepositoryError::DuplicateUserName(name.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_constraint(info.as_ref(), "users_email_key") =>
                    {
                        DirectoryRepositoryError::DuplicateEmail(email.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        DirectoryRepositoryError::DuplicateUser(user_id)
                    }
                    _ => DirectoryRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_user(&self, user: &User) -> DirectoryRepositoryResult<()> {
        let row = user_to_row(user);
        let user_id = user.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(users::table.filter(users::id.eq(user_id.into_inner())))
                .set(&row)
                .execute(connection)
                .map_err(DirectoryRepositoryError::persistence)?;
            if updated == 0 {
                return Err(DirectoryRepositoryError::UserNotFound(user_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_user(&self, id: UserId) -> DirectoryRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_user_by_name(
        &self,
        name: &UserName,
    ) -> DirectoryRepositoryResult<Option<User>> {
        let lookup = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::user_name.eq(lookup))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> DirectoryRepositoryResult<Option<User>> {
        let lookup = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::email.eq(lookup))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn insert_team(&self, team: &Team) -> DirectoryRepositoryResult<()> {
        let row = team_to_row(team);
        let team_id = team.id();
        self.run_blocking(move |connection| {
            diesel::insert_into(teams::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        DirectoryRepositoryError::DuplicateTeam(team_id)
                    }
                    _ => DirectoryRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_team(&self, team: &Team) -> DirectoryRepositoryResult<()> {
        let row = team_to_row(team);
        let team_id = team.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(teams::table.filter(teams::id.eq(team_id.into_inner())))
                .set(&row)
                .execute(connection)
                .map_err(DirectoryRepositoryError::persistence)?;
            if updated == 0 {
                return Err(DirectoryRepositoryError::TeamNotFound(team_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_team(&self, id: TeamId) -> DirectoryRepositoryResult<Option<Team>> {
        self.run_blocking(move |connection| {
            let row = teams::table
                .filter(teams::id.eq(id.into_inner()))
                .select(TeamRow::as_select())
                .first::<TeamRow>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?;
            row.map(row_to_team).transpose()
        })
        .await
    }

    async fn delete_team(&self, id: TeamId) -> DirectoryRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            connection.transaction(|tx| {
                let cascaded = diesel::delete(
                    team_members::table.filter(team_members::team_id.eq(id.into_inner())),
                )
                .execute(tx)
                .map_err(DirectoryRepositoryError::persistence)?;
                let deleted =
                    diesel::delete(teams::table.filter(teams::id.eq(id.into_inner())))
                        .execute(tx)
                        .map_err(DirectoryRepositoryError::persistence)?;
                if deleted == 0 {
                    return Err(DirectoryRepositoryError::TeamNotFound(id));
                }
                u64::try_from(cascaded).map_err(DirectoryRepositoryError::persistence)
            })
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> DirectoryRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            connection.transaction(|tx| {
                let cascaded = diesel::delete(
                    team_members::table.filter(team_members::user_id.eq(id.into_inner())),
                )
                .execute(tx)
                .map_err(DirectoryRepositoryError::persistence)?;
                diesel::delete(
                    password_reset_tokens::table
                        .filter(password_reset_tokens::user_id.eq(id.into_inner())),
                )
                .execute(tx)
                .map_err(DirectoryRepositoryError::persistence)?;
                let deleted = diesel::delete(users::table.filter(users::id.eq(id.into_inner())))
                    .execute(tx)
                    .map_err(DirectoryRepositoryError::persistence)?;
                if deleted == 0 {
                    return Err(DirectoryRepositoryError::UserNotFound(id));
                }
                u64::try_from(cascaded).map_err(DirectoryRepositoryError::persistence)
            })
        })
        .await
    }

    async fn insert_membership(
        &self,
        membership: &TeamMembership,
    ) -> DirectoryRepositoryResult<()> {
        let row = membership_to_row(membership);
        let team_id = membership.team_id();
        let user_id = membership.user_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(team_members::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        DirectoryRepositoryError::DuplicateMembership { team_id, user_id }
                    }
                    _ => DirectoryRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_membership(
        &self,
        membership: &TeamMembership,
    ) -> DirectoryRepositoryResult<()> {
        let row = membership_to_row(membership);
        let team_id = membership.team_id();
        let user_id = membership.user_id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                team_members::table
                    .filter(team_members::team_id.eq(team_id.into_inner()))
                    .filter(team_members::user_id.eq(user_id.into_inner())),
            )
            .set(&row)
            .execute(connection)
            .map_err(DirectoryRepositoryError::persistence)?;
            if updated == 0 {
                return Err(DirectoryRepositoryError::MembershipNotFound { team_id, user_id });
            }
            Ok(())
        })
        .await
    }

    async fn find_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> DirectoryRepositoryResult<Option<TeamMembership>> {
        self.run_blocking(move |connection| {
            let row = team_members::table
                .filter(team_members::team_id.eq(team_id.into_inner()))
                .filter(team_members::user_id.eq(user_id.into_inner()))
                .select(TeamMemberRow::as_select())
                .first::<TeamMemberRow>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?;
            Ok(row.map(row_to_membership))
        })
        .await
    }

    async fn memberships_for_user(
        &self,
        user_id: UserId,
    ) -> DirectoryRepositoryResult<Vec<TeamMembership>> {
        self.run_blocking(move |connection| {
            let rows = team_members::table
                .filter(team_members::user_id.eq(user_id.into_inner()))
                .filter(team_members::active.eq(true))
                .select(TeamMemberRow::as_select())
                .load::<TeamMemberRow>(connection)
                .map_err(DirectoryRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_membership).collect())
        })
        .await
    }

    async fn project_managers_of(
        &self,
        team_id: TeamId,
    ) -> DirectoryRepositoryResult<Vec<UserId>> {
        self.run_blocking(move |connection| {
            let ids = team_members::table
                .filter(team_members::team_id.eq(team_id.into_inner()))
                .filter(team_members::active.eq(true))
                .filter(team_members::project_manager.eq(true))
                .select(team_members::user_id)
                .load::<Uuid>(connection)
                .map_err(DirectoryRepositoryError::persistence)?;
            Ok(ids.into_iter().map(UserId::from_uuid).collect())
        })
        .await
    }

    async fn insert_reset_token(
        &self,
        token: &PasswordResetToken,
    ) -> DirectoryRepositoryResult<()> {
        let row = token_to_row(token);
        self.run_blocking(move |connection| {
            diesel::insert_into(password_reset_tokens::table)
                .values(&row)
                .execute(connection)
                .map_err(DirectoryRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_reset_token(
        &self,
        id: Uuid,
    ) -> DirectoryRepositoryResult<Option<PasswordResetToken>> {
        self.run_blocking(move |connection| {
            let row = password_reset_tokens::table
                .filter(password_reset_tokens::id.eq(id))
                .select(PasswordResetTokenRow::as_select())
                .first::<PasswordResetTokenRow>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?;
            Ok(row.map(row_to_token))
        })
        .await
    }

    async fn update_reset_token(
        &self,
        token: &PasswordResetToken,
    ) -> DirectoryRepositoryResult<()> {
        let row = token_to_row(token);
        let token_id = token.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                password_reset_tokens::table.filter(password_reset_tokens::id.eq(token_id)),
            )
            .set(&row)
            .execute(connection)
            .map_err(DirectoryRepositoryError::persistence)?;
            if updated == 0 {
                return Err(DirectoryRepositoryError::ResetTokenNotFound(token_id));
            }
            Ok(())
        })
        .await
    }
}

fn is_constraint(info: &dyn DatabaseErrorInformation, name: &str) -> bool {
    info.constraint_name().is_some_and(|found| found == name)
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        id: user.id().into_inner(),
        user_name: user.name().as_str().to_owned(),
        email: user.email().as_str().to_owned(),
        credential_hash: user.credential_hash().to_owned(),
        role: user.role().as_str().to_owned(),
        active: user.is_active(),
        must_change_password: user.must_change_password(),
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    }
}

fn row_to_user(row: UserRow) -> DirectoryRepositoryResult<User> {
    let name = UserName::new(row.user_name).map_err(DirectoryRepositoryError::persistence)?;
    let email = EmailAddress::new(row.email).map_err(DirectoryRepositoryError::persistence)?;
    let role =
        Role::try_from(row.role.as_str()).map_err(DirectoryRepositoryError::persistence)?;
    Ok(User::from_persisted(PersistedUserData {
        id: UserId::from_uuid(row.id),
        name,
        email,
        credential_hash: row.credential_hash,
        role,
        active: row.active,
        must_change_password: row.must_change_password,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn team_to_row(team: &Team) -> TeamRow {
    TeamRow {
        id: team.id().into_inner(),
        team_name: team.name().as_str().to_owned(),
        active: team.is_active(),
        created_at: team.created_at(),
        updated_at: team.updated_at(),
    }
}

fn row_to_team(row: TeamRow) -> DirectoryRepositoryResult<Team> {
    let name = TeamName::new(row.team_name).map_err(DirectoryRepositoryError::persistence)?;
    Ok(Team::from_persisted(
        TeamId::from_uuid(row.id),
        name,
        row.active,
        row.created_at,
        row.updated_at,
    ))
}

fn membership_to_row(membership: &TeamMembership) -> TeamMemberRow {
    TeamMemberRow {
        team_id: membership.team_id().into_inner(),
        user_id: membership.user_id().into_inner(),
        project_manager: membership.is_project_manager(),
        active: membership.is_active(),
        joined_at: membership.joined_at(),
        updated_at: membership.updated_at(),
    }
}

fn row_to_membership(row: TeamMemberRow) -> TeamMembership {
    TeamMembership::from_persisted(
        TeamId::from_uuid(row.team_id),
        UserId::from_uuid(row.user_id),
        row.project_manager,
        row.active,
        row.joined_at,
        row.updated_at,
    )
}

fn token_to_row(token: &PasswordResetToken) -> PasswordResetTokenRow {
    PasswordResetTokenRow {
        id: token.id(),
        user_id: token.user_id().into_inner(),
        issued_at: token.issued_at(),
        expires_at: token.expires_at(),
        consumed_at: token.consumed_at(),
    }
}

fn row_to_token(row: PasswordResetTokenRow) -> PasswordResetToken {
    PasswordResetToken::from_persisted(
        row.id,
        UserId::from_uuid(row.user_id),
        row.issued_at,
        row.expires_at,
        row.consumed_at,
    )
}
