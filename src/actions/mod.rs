//! The actions a hook can run against each pushed commit.
//!
//! Every action implements [`HookAction`]: it examines one [`Commit`] and
//! returns `Ok` when the commit passes (or the action's side effect
//! succeeded) and `Err` when it does not. How a failure is treated is the
//! runner's business, not the action's: on pre-receive it rejects the push,
//! on post-receive it is logged and the pipeline moves on.
//!
//! Actions talk to the outside world only through the client traits in
//! [`crate::clients`], so each one can be exercised against fakes.

use crate::commit::Commit;
use crate::config::ActionKind;
use crate::error::HookError;

mod build;
mod directives;
mod freeze;
mod issues;
mod review;

pub use build::{BuildHealthGate, BuildTrigger};
pub use freeze::CodeFreezeGate;
pub use issues::IssueCommentNotifier;
pub use review::{ReviewAbandonNotifier, ReviewApprovalGate, ReviewMergeNotifier};

// --- trait --------------------------------------------------------------

/// One configured step of a hook pipeline.
pub trait HookAction {
    /// Which configured action this is. Used in logs and failure messages.
    fn kind(&self) -> ActionKind;

    /// Examine one commit.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Action`] when the commit does not pass, and
    /// [`HookError::Git`] when a repository lookup the action depends on
    /// fails.
    fn run(&self, commit: &Commit<'_>) -> Result<(), HookError>;
}

impl std::fmt::Debug for dyn HookAction + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HookAction({})", self.kind())
    }
}
