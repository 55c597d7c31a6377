//! User aggregate root and validated account scalars.

use super::{DirectoryDomainError, ParseRoleError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role controlling which workflow operations a user may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Works on assigned tasks and records progress.
    Developer,
    /// Validates and rejects submitted tasks within the teams that grant it.
    ProjectManager,
    /// Administers the roster and reads reporting aggregates.
    Manager,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Developer => "developer",
            Self::ProjectManager => "project_manager",
            Self::Manager => "manager",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "developer" => Ok(Self::Developer),
            "project_manager" => Ok(Self::ProjectManager),
            "manager" => Ok(Self::Manager),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Validated account name, unique across the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    const MAX_LENGTH: usize = 64;

    /// Creates a validated user name.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::InvalidUserName`] when the value is
    /// empty after trimming, exceeds 64 characters, or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = !normalized.is_empty()
            && normalized.chars().count() <= Self::MAX_LENGTH
            && !normalized.chars().any(char::is_whitespace);
        if !is_valid {
            return Err(DirectoryDomainError::InvalidUserName(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated, case-normalized email address, unique across the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MAX_LENGTH: usize = 254;

    /// Creates a validated email address.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::InvalidEmailAddress`] when the value
    /// does not contain exactly one `@` with non-empty local and domain
    /// parts, or exceeds 254 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        let mut parts = normalized.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        let has_more_parts = parts.next().is_some();
        let is_valid = !local.is_empty()
            && !domain.is_empty()
            && domain.contains('.')
            && !has_more_parts
            && normalized.chars().count() <= Self::MAX_LENGTH
            && !normalized.chars().any(char::is_whitespace);
        if !is_valid {
            return Err(DirectoryDomainError::InvalidEmailAddress(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User account aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    credential_hash: String,
    role: Role,
    active: bool,
    must_change_password: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted account name.
    pub name: UserName,
    /// Persisted email address.
    pub email: EmailAddress,
    /// Persisted opaque credential hash.
    pub credential_hash: String,
    /// Persisted role.
    pub role: Role,
    /// Persisted active flag.
    pub active: bool,
    /// Persisted must-change-password flag.
    pub must_change_password: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user account.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyCredentialHash`] when the
    /// supplied credential hash is empty.
    pub fn new(
        name: UserName,
        email: EmailAddress,
        credential_hash: impl Into<String>,
        role: Role,
        clock: &impl Clock,
    ) -> Result<Self, DirectoryDomainError> {
        let hash = credential_hash.into();
        if hash.trim().is_empty() {
            return Err(DirectoryDomainError::EmptyCredentialHash);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: UserId::new(),
            name,
            email,
            credential_hash: hash,
            role,
            active: true,
            must_change_password: false,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            email: data.email,
            credential_hash: data.credential_hash,
            role: data.role,
            active: data.active,
            must_change_password: data.must_change_password,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the account name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the opaque credential hash.
    #[must_use]
    pub fn credential_hash(&self) -> &str {
        &self.credential_hash
    }

    /// Returns the account role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns whether the account is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether the user must change their password at next login.
    #[must_use]
    pub const fn must_change_password(&self) -> bool {
        self.must_change_password
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Deactivates the account.
    pub fn deactivate(&mut self, clock: &impl Clock) {
        self.active = false;
        self.touch(clock);
    }

    /// Changes the account role.
    pub fn change_role(&mut self, role: Role, clock: &impl Clock) {
        self.role = role;
        self.touch(clock);
    }

    /// Flags the account so the next login forces a password change.
    pub fn require_password_change(&mut self, clock: &impl Clock) {
        self.must_change_password = true;
        self.touch(clock);
    }

    /// Stores a new credential hash and clears the must-change flag.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyCredentialHash`] when the
    /// supplied hash is empty.
    pub fn set_credential(
        &mut self,
        credential_hash: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), DirectoryDomainError> {
        let hash = credential_hash.into();
        if hash.trim().is_empty() {
            return Err(DirectoryDomainError::EmptyCredentialHash);
        }
        self.credential_hash = hash;
        self.must_change_password = false;
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
