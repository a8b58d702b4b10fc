//! Recoverable action failures.
//!
//! None of these interrupt the session: the action is ignored, the state is
//! unchanged, and the host decides how to surface the message.

use std::fmt;

use ruler_shared::units::MeasureMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    /// Placement was requested while no surface is under the reticle.
    NoTarget,
    /// The active mode already has all the samples it needs.
    AlreadyLocked { mode: MeasureMode, required: usize },
}

impl ActionError {
    /// True for actions that do not apply to the current state, as opposed to
    /// a missing hit-test result.
    pub fn is_invalid_action(&self) -> bool {
        matches!(self, ActionError::AlreadyLocked { .. })
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::NoTarget => write!(f, "no surface found"),
            ActionError::AlreadyLocked { mode, required } => {
                write!(f, "max points reached for {mode} mode ({required})")
            }
        }
    }
}

impl std::error::Error for ActionError {}
