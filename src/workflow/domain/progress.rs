//! Validated progress percentage.

use super::WorkflowDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task or project completion percentage, always within `[0, 100]`.
///
/// Caller input outside the range is a typed error, never silently clamped.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Progress(u8);

impl Progress {
    /// The zero percentage.
    pub const ZERO: Self = Self(0);

    /// The completed percentage that submits a task for validation.
    pub const COMPLETE: Self = Self(100);

    /// Creates a validated progress value.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::ProgressOutOfRange`] when the value
    /// exceeds 100.
    pub fn new(value: u8) -> Result<Self, WorkflowDomainError> {
        if value > 100 {
            return Err(WorkflowDomainError::ProgressOutOfRange(i16::from(value)));
        }
        Ok(Self(value))
    }

    /// Creates a progress value from a persisted wide integer.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::ProgressOutOfRange`] when the value
    /// lies outside `[0, 100]`.
    pub fn from_persisted(value: i16) -> Result<Self, WorkflowDomainError> {
        u8::try_from(value)
            .ok()
            .and_then(|narrow| Self::new(narrow).ok())
            .ok_or(WorkflowDomainError::ProgressOutOfRange(value))
    }

    /// Returns the percentage as `u8`.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns the percentage widened for persistence.
    #[must_use]
    pub fn as_i16(self) -> i16 {
        i16::from(self.0)
    }

    /// Returns whether the value is the submission threshold.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        self.0 == 100
    }

    /// Returns the rounded mean of a slice of progress values.
    ///
    /// An empty slice reports zero, so a project without tasks renders as
    /// not started.
    #[must_use]
    pub fn mean(values: &[Self]) -> Self {
        if values.is_empty() {
            return Self::ZERO;
        }
        let sum: u32 = values.iter().map(|progress| u32::from(progress.0)).sum();
        let count = u32::try_from(values.len()).unwrap_or(u32::MAX);
        // Round-half-up: (sum + count / 2) / count == (2 * sum + count) / (2 * count).
        let mean = (sum * 2 + count)
            .checked_div(count * 2)
            .and_then(|value| u8::try_from(value).ok())
            .unwrap_or(0);
        Self(mean.min(100))
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
