//! Notification body rendering.
//!
//! Workflow notifications carry a short rendered sentence alongside their
//! typed kind so a delivery layer can display them without joining task and
//! project rows. Bodies are rendered from fixed templates with the task,
//! project, actor, and (for rejections) reason in context.

use crate::workflow::domain::NotificationKind;
use minijinja::{Environment, context};
use thiserror::Error;

const ASSIGNED_TEMPLATE: &str = r#"{{ actor }} assigned you the task "{{ task }}" in project "{{ project }}""#;
const AWAITING_VALIDATION_TEMPLATE: &str =
    r#"The task "{{ task }}" in project "{{ project }}" reached 100% and awaits validation"#;
const VALIDATED_TEMPLATE: &str = r#"{{ actor }} validated your task "{{ task }}""#;
const REJECTED_TEMPLATE: &str = r#"{{ actor }} sent back your task "{{ task }}": {{ reason }}"#;

/// Error returned when a notification body fails to render.
#[derive(Debug, Error)]
#[error("failed to render notification body: {0}")]
pub struct ComposeError(#[from] minijinja::Error);

/// Rendering context for one workflow notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationContext {
    /// Task display name.
    pub task: String,
    /// Project display name.
    pub project: String,
    /// Acting user's display name.
    pub actor: String,
    /// Rejection reason, present for [`NotificationKind::Rejected`].
    pub reason: Option<String>,
}

/// Renders notification bodies for workflow transitions.
#[derive(Debug)]
pub struct NotificationComposer {
    environment: Environment<'static>,
}

impl NotificationComposer {
    /// Creates a composer with the built-in workflow templates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
        }
    }

    /// Renders the body for one workflow notification kind.
    ///
    /// The general kinds (`Info`, `Warning`, `Success`, `Error`) carry
    /// caller-supplied bodies and are not rendered here; they fall back to
    /// the raw reason or an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError`] when template rendering fails.
    pub fn render(
        &self,
        kind: NotificationKind,
        context: &NotificationContext,
    ) -> Result<String, ComposeError> {
        let template = match kind {
            NotificationKind::Assigned => ASSIGNED_TEMPLATE,
            NotificationKind::AwaitingValidation => AWAITING_VALIDATION_TEMPLATE,
            NotificationKind::Validated => VALIDATED_TEMPLATE,
            NotificationKind::Rejected => REJECTED_TEMPLATE,
            NotificationKind::Info
            | NotificationKind::Warning
            | NotificationKind::Success
            | NotificationKind::Error => {
                return Ok(context.reason.clone().unwrap_or_default());
            }
        };
        let rendered = self.environment.render_named_str(
            kind.as_str(),
            template,
            context! {
                task => context.task,
                project => context.project,
                actor => context.actor,
                reason => context.reason.clone().unwrap_or_default(),
            },
        )?;
        Ok(rendered)
    }
}

impl Default for NotificationComposer {
    fn default() -> Self {
        Self::new()
    }
}
