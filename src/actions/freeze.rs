//! The code-freeze gate.

use tracing::info;

use crate::commit::Commit;
use crate::config::{ActionKind, FreezeConfig};
use crate::error::HookError;

use super::HookAction;

/// Rejects pushes while the project is frozen.
///
/// Superusers may bypass a freeze, but only when the system configuration
/// names an environment variable that identifies the pushing user. Without
/// one there is nobody to trust and the freeze is absolute.
pub struct CodeFreezeGate {
    freeze: FreezeConfig,
    pusher: Option<String>,
}

impl CodeFreezeGate {
    /// Resolve the pushing user from the configured environment variable.
    ///
    /// The variable is read once at construction; hook processes are
    /// short-lived and their environment does not change mid-run.
    #[must_use]
    pub fn new(freeze: FreezeConfig) -> Self {
        let pusher = freeze
            .user_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok());
        Self { freeze, pusher }
    }

    /// Like [`CodeFreezeGate::new`] but with the pushing user supplied
    /// directly instead of read from the environment.
    #[must_use]
    pub const fn with_pusher(freeze: FreezeConfig, pusher: Option<String>) -> Self {
        Self { freeze, pusher }
    }
}

impl HookAction for CodeFreezeGate {
    fn kind(&self) -> ActionKind {
        ActionKind::CodeFreezeGate
    }

    fn run(&self, commit: &Commit<'_>) -> Result<(), HookError> {
        let project = commit.project();
        if !self.freeze.is_frozen(project) {
            return Ok(());
        }
        let Some(var) = self.freeze.user_env.as_deref() else {
            return Err(HookError::action(
                self.kind(),
                format!("project {project} is frozen"),
            ));
        };
        match self.pusher.as_deref() {
            Some(user) if self.freeze.is_superuser(user) => {
                info!(user, project, "freeze bypassed by superuser");
                Ok(())
            }
            Some(user) => Err(HookError::action(
                self.kind(),
                format!("project {project} is frozen and {user} is not a superuser"),
            )),
            None => Err(HookError::action(
                self.kind(),
                format!(
                    "project {project} is frozen and the pushing user is unknown ({var} is unset)"
                ),
            )),
        }
    }
}
