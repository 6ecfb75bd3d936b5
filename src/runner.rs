//! Executes the planned actions for one commit under a hook's halt policy.

use std::fmt;

use tracing::{debug, warn};

use crate::actions::HookAction;
use crate::commit::Commit;
use crate::error::HookError;

// --- hook type -------------------------------------------------------------

/// The two server-side hooks gatehouse can run as.
///
/// The halt policy is the only behavioral difference, so it lives here as
/// data instead of in two runner variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookType {
    /// Evaluated before the push is accepted; a failure rejects it.
    PreReceive,
    /// Evaluated after the push is accepted; failures are logged only.
    PostReceive,
}

impl HookType {
    /// Whether an action failure stops the pipeline and rejects the push.
    #[must_use]
    pub const fn halts_on_failure(self) -> bool {
        matches!(self, Self::PreReceive)
    }

    /// Resolve from a git hook name (`pre-receive`, `post-receive`), as used
    /// for script names and subcommands.
    #[must_use]
    pub fn from_hook_name(name: &str) -> Option<Self> {
        match name {
            "pre-receive" => Some(Self::PreReceive),
            "post-receive" => Some(Self::PostReceive),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreReceive => "pre-receive",
            Self::PostReceive => "post-receive",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- runner ------------------------------------------------------------------

/// Runs an ordered action list against commits.
///
/// The action list is planned once per invocation (see
/// [`crate::registry::ActionRegistry`]) and reused for every commit in the
/// push.
pub struct HookRunner<'c> {
    hook: HookType,
    actions: Vec<Box<dyn HookAction + 'c>>,
}

impl<'c> HookRunner<'c> {
    #[must_use]
    pub fn new(hook: HookType, actions: Vec<Box<dyn HookAction + 'c>>) -> Self {
        Self { hook, actions }
    }

    #[must_use]
    pub const fn hook(&self) -> HookType {
        self.hook
    }

    /// The planned actions, in execution order.
    #[must_use]
    pub fn actions(&self) -> &[Box<dyn HookAction + 'c>] {
        &self.actions
    }

    /// Run every action against `commit`, in configured order.
    ///
    /// Under pre-receive the first failure is returned and the remaining
    /// actions are not attempted. Under post-receive failures are logged and
    /// the remaining actions still run; only hard errors (which indicate a
    /// broken deployment, not a bad commit) propagate.
    ///
    /// # Errors
    /// Returns the first action failure for a halting hook, and hard errors
    /// for both hooks.
    pub fn run(&self, commit: &Commit<'_>) -> Result<(), HookError> {
        for action in &self.actions {
            match action.run(commit) {
                Ok(()) => {
                    debug!(
                        action = %action.kind(),
                        commit = %commit.hash().short(),
                        "action passed"
                    );
                }
                Err(e) if self.hook.halts_on_failure() || e.is_hard() => return Err(e),
                Err(e) => {
                    warn!(
                        action = %action.kind(),
                        commit = %commit.hash().short(),
                        error = %e,
                        "action failed, continuing"
                    );
                }
            }
        }
        Ok(())
    }
}
