//! Project document records for uploaded reference files.
//!
//! Only the record is modelled: blob storage itself lives outside this
//! crate. The record keeps a SHA-256 digest of the uploaded content so a
//! retrieval layer can verify what it serves.

use super::{DocumentId, ProjectId, WorkflowDomainError};
use crate::directory::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Validated uploaded-file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileName(String);

impl FileName {
    const MAX_LENGTH: usize = 255;

    /// Creates a validated file name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidFileName`] when the value is
    /// empty after trimming, exceeds 255 characters, or contains path
    /// separators.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkflowDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = !normalized.is_empty()
            && normalized.chars().count() <= Self::MAX_LENGTH
            && !normalized.contains('/')
            && !normalized.contains('\\');
        if !is_valid {
            return Err(WorkflowDomainError::InvalidFileName(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the file name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase hex SHA-256 digest of uploaded content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Computes the digest of raw content.
    #[must_use]
    pub fn of(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            hex.push_str(&format!("{byte:02x}"));
        }
        Self(hex)
    }

    /// Wraps a digest previously computed and persisted.
    #[must_use]
    pub fn from_persisted(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Returns the digest as lowercase hex.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ContentDigest {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Record of one uploaded file scoped to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocument {
    id: DocumentId,
    project_id: ProjectId,
    file_name: FileName,
    size_bytes: u64,
    digest: ContentDigest,
    uploaded_by: UserId,
    created_at: DateTime<Utc>,
}

impl ProjectDocument {
    /// Creates a new document record.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        file_name: FileName,
        size_bytes: u64,
        digest: ContentDigest,
        uploaded_by: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            project_id,
            file_name,
            size_bytes,
            digest,
            uploaded_by,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a document record from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: DocumentId,
        project_id: ProjectId,
        file_name: FileName,
        size_bytes: u64,
        digest: ContentDigest,
        uploaded_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project_id,
            file_name,
            size_bytes,
            digest,
            uploaded_by,
            created_at,
        }
    }

    /// Returns the document identifier.
    #[must_use]
    pub const fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the uploaded-file name.
    #[must_use]
    pub const fn file_name(&self) -> &FileName {
        &self.file_name
    }

    /// Returns the uploaded size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Returns the content digest.
    #[must_use]
    pub const fn digest(&self) -> &ContentDigest {
        &self.digest
    }

    /// Returns the uploader.
    #[must_use]
    pub const fn uploaded_by(&self) -> UserId {
        self.uploaded_by
    }

    /// Returns the upload timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
