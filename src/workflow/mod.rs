//! Task validation workflow for Chantier.
//!
//! This module implements the project side of the data model and the state
//! machine governing a task's status, progress, validation, and rejection
//! fields: recording progress forces submitted work into awaiting-validation,
//! project managers approve or send work back with a persisted reason, and
//! every transition commits its notification and comment side effects as one
//! atomic unit. Deletion flows consult a declarative ownership table instead
//! of scattered per-entity checks. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Transport-facing payload shapes in [`surface`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod surface;

#[cfg(test)]
mod tests;
