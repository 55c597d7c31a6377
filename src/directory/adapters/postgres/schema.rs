//! Diesel schema for directory persistence.

diesel::table! {
    /// User accounts with unique name and email.
    users (id) {
        /// Internal user identifier.
        id -> Uuid,
        /// Unique account name.
        #[max_length = 64]
        user_name -> Varchar,
        /// Unique, lowercased email address.
        #[max_length = 254]
        email -> Varchar,
        /// Opaque credential hash.
        credential_hash -> Text,
        /// Account role.
        #[max_length = 50]
        role -> Varchar,
        /// Active flag.
        active -> Bool,
        /// Forced password-change flag.
        must_change_password -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Teams owning members and projects.
    teams (id) {
        /// Internal team identifier.
        id -> Uuid,
        /// Team display name.
        #[max_length = 100]
        team_name -> Varchar,
        /// Active flag.
        active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Membership join rows with composite identity.
    team_members (team_id, user_id) {
        /// Team side of the composite key.
        team_id -> Uuid,
        /// User side of the composite key.
        user_id -> Uuid,
        /// Project-manager authority flag, scoped to the team.
        project_manager -> Bool,
        /// Soft-removal flag.
        active -> Bool,
        /// Join timestamp.
        joined_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Single-use password-reset tokens.
    password_reset_tokens (id) {
        /// Token identifier.
        id -> Uuid,
        /// Account the token belongs to.
        user_id -> Uuid,
        /// Issue timestamp.
        issued_at -> Timestamptz,
        /// Expiry timestamp.
        expires_at -> Timestamptz,
        /// Consumption timestamp, if consumed.
        consumed_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(team_members -> teams (team_id));
diesel::joinable!(team_members -> users (user_id));
diesel::joinable!(password_reset_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, teams, team_members, password_reset_tokens);
