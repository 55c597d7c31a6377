//! Application services for directory orchestration.

mod roster;

pub use roster::{AddMemberRequest, RegisterUserRequest, RosterError, RosterResult, RosterService};
