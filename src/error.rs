//! Pipeline error types.
//!
//! Defines [`HookError`], the unified error type for hook execution. The
//! variants match the three failure classes the pipeline distinguishes:
//!
//! - **configuration** defects (bad file, unknown action placement, missing
//!   endpoint) abort the whole invocation regardless of hook type;
//! - **git access** failures reject a pre-receive push and are logged during
//!   post-receive;
//! - **action** failures are the expected "this commit does not pass" case,
//!   fatal for pre-receive and absorbed for post-receive.

use gatehouse_git::GitError;
use thiserror::Error;

use crate::config::{ActionKind, ConfigError};

/// Boxed cause attached to an action failure.
pub type ActionCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for hook execution.
#[derive(Debug, Error)]
pub enum HookError {
    /// A configuration file could not be loaded, or its contents name an
    /// action the registry refuses (wrong placement, missing endpoint).
    /// Always fatal; exits non-zero even for post-receive.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The update stream on stdin did not follow the
    /// `"<old> <new> <refname>"` hook protocol. Only a broken invocation
    /// produces this; always fatal.
    #[error("malformed update line: {message}")]
    Protocol {
        /// What was wrong with the line.
        message: String,
    },

    /// Reading commit data from the repository failed.
    #[error("git access failed: {0}")]
    Git(#[from] GitError),

    /// An action examined the commit and rejected it, or could not complete
    /// its side effect.
    #[error("{action}: {reason}")]
    Action {
        /// Which action failed.
        action: ActionKind,
        /// Human-readable reason, surfaced to the pushing client for
        /// pre-receive.
        reason: String,
        /// Underlying cause, when the failure wraps an external-system
        /// error.
        #[source]
        source: Option<ActionCause>,
    },
}

impl HookError {
    /// Construct an action failure with no underlying cause.
    pub fn action(action: ActionKind, reason: impl Into<String>) -> Self {
        Self::Action {
            action,
            reason: reason.into(),
            source: None,
        }
    }

    /// Construct an action failure wrapping an external-system error.
    pub fn action_with_cause(
        action: ActionKind,
        reason: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Action {
            action,
            reason: reason.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// `true` for errors that indicate a deployment defect rather than a
    /// commit defect. These abort the invocation regardless of hook type.
    #[must_use]
    pub const fn is_hard(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Protocol { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_display_names_action_and_reason() {
        let err = HookError::action(ActionKind::BuildHealthGate, "build 42 is not healthy");
        assert_eq!(
            err.to_string(),
            "build-health-gate: build 42 is not healthy"
        );
    }

    #[test]
    fn config_errors_are_hard() {
        let err = HookError::Config(ConfigError {
            path: None,
            message: "line 3: unknown action".into(),
        });
        assert!(err.is_hard());
    }

    #[test]
    fn action_errors_are_not_hard() {
        let err = HookError::action(ActionKind::CodeFreezeGate, "project is frozen");
        assert!(!err.is_hard());
    }

    #[test]
    fn action_cause_is_chained() {
        let io = std::io::Error::other("connection refused");
        let err = HookError::action_with_cause(ActionKind::BuildTrigger, "cannot reach CI", io);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("connection refused"));
    }
}
