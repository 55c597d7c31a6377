//! Diesel row models for directory persistence.

use super::schema::{password_reset_tokens, team_members, teams, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query and insert model for user rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Internal user identifier.
    pub id: uuid::Uuid,
    /// Unique account name.
    pub user_name: String,
    /// Unique, lowercased email address.
    pub email: String,
    /// Opaque credential hash.
    pub credential_hash: String,
    /// Account role.
    pub role: String,
    /// Active flag.
    pub active: bool,
    /// Forced password-change flag.
    pub must_change_password: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert model for team rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamRow {
    /// Internal team identifier.
    pub id: uuid::Uuid,
    /// Team display name.
    pub team_name: String,
    /// Active flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert model for membership rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = team_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamMemberRow {
    /// Team side of the composite key.
    pub team_id: uuid::Uuid,
    /// User side of the composite key.
    pub user_id: uuid::Uuid,
    /// Project-manager authority flag.
    pub project_manager: bool,
    /// Soft-removal flag.
    pub active: bool,
    /// Join timestamp.
    pub joined_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert model for password-reset token rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = password_reset_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PasswordResetTokenRow {
    /// Token identifier.
    pub id: uuid::Uuid,
    /// Account the token belongs to.
    pub user_id: uuid::Uuid,
    /// Issue timestamp.
    pub issued_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Consumption timestamp, if consumed.
    pub consumed_at: Option<DateTime<Utc>>,
}
