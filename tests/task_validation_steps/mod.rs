//! Step definitions for task validation BDD scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
