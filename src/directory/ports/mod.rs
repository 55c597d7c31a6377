//! Port contracts for the identity and team directory.
//!
//! Ports define infrastructure-agnostic interfaces used by directory
//! services.

pub mod repository;

pub use repository::{DirectoryRepository, DirectoryRepositoryError, DirectoryRepositoryResult};
