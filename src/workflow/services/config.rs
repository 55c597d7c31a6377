//! Tunable limits and policies for the workflow engine.

/// Progress a task resumes at when submitted work is sent back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RejectionProgressPolicy {
    /// Resume at the progress the assignee last recorded before submitting.
    #[default]
    RevertToRecorded,
    /// Resume from scratch.
    ResetToZero,
}

/// Workflow engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Maximum rejection-reason length in characters.
    pub max_reason_chars: usize,
    /// Maximum comment length in characters.
    pub max_comment_chars: usize,
    /// Progress policy applied when work is sent back.
    pub rejection_progress: RejectionProgressPolicy,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_reason_chars: 2000,
            max_comment_chars: 2000,
            rejection_progress: RejectionProgressPolicy::default(),
        }
    }
}
