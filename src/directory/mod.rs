//! Identity and team directory for Chantier.
//!
//! This module owns the people side of the data model: user accounts, teams,
//! the membership join rows that scope project-manager authority to a team,
//! and password-reset tokens. It also resolves a caller's capability set,
//! which the workflow engine consults before applying any transition. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
