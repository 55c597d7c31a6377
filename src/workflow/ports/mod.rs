//! Port contracts for the task validation workflow.
//!
//! Ports define infrastructure-agnostic interfaces used by workflow
//! services.

pub mod store;

pub use store::{
    CascadeReport, TransitionRecord, WorkflowStore, WorkflowStoreError, WorkflowStoreResult,
};
