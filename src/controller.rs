//! Top-level orchestration of one hook invocation.

use std::io::BufRead;

use gatehouse_git::{GitClient, Oid};
use tracing::{debug, info, warn};

use crate::commit::Commit;
use crate::config::ProjectConfig;
use crate::error::HookError;
use crate::registry::ActionRegistry;
use crate::runner::{HookRunner, HookType};
use crate::walker::RevisionWalker;

/// Drives walker and runner for every commit of a push.
///
/// The controller is handed everything it needs up front; it performs no
/// configuration loading or client construction of its own, which keeps one
/// invocation's view of the world fixed from start to finish.
pub struct HookController<'c> {
    git: &'c dyn GitClient,
    project: String,
    config: &'c ProjectConfig,
    registry: ActionRegistry<'c>,
}

impl<'c> HookController<'c> {
    pub fn new(
        git: &'c dyn GitClient,
        project: impl Into<String>,
        config: &'c ProjectConfig,
        registry: ActionRegistry<'c>,
    ) -> Self {
        Self {
            git,
            project: project.into(),
            config,
            registry,
        }
    }

    /// Process one hook invocation: plan the actions, read the update
    /// stream, and run the plan against every expanded commit.
    ///
    /// The plan is built before the first line of stdin is read, so a
    /// configuration defect aborts the invocation up front instead of
    /// halfway through a push.
    ///
    /// # Errors
    ///
    /// For pre-receive, the first action failure (or git access failure) is
    /// returned and nothing further runs; the caller turns it into a
    /// non-zero exit that rejects the push. For post-receive only hard
    /// errors are returned; action failures have already been logged and
    /// absorbed.
    pub fn run(&self, hook: HookType, input: impl BufRead) -> Result<(), HookError> {
        let entries = match hook {
            HookType::PreReceive => &self.config.pre_receive,
            HookType::PostReceive => &self.config.post_receive,
        };
        let runner = HookRunner::new(hook, self.registry.plan(hook, entries)?);
        let walker = RevisionWalker::new(self.git, &self.config.watch_refs);

        let updates = walker.parse(input)?;
        if runner.actions().is_empty() {
            debug!(hook = %hook, "no actions configured, nothing to run");
            return Ok(());
        }

        for update in &updates {
            let commits = match walker.expand(update) {
                Ok(commits) => commits,
                Err(e) if hook.halts_on_failure() || e.is_hard() => return Err(e),
                Err(e) => {
                    warn!(
                        ref_name = %update.ref_name,
                        error = %e,
                        "could not expand update, skipping ref"
                    );
                    continue;
                }
            };
            info!(
                hook = %hook,
                ref_name = %update.ref_name,
                commits = commits.len(),
                "processing update"
            );
            for hash in commits {
                let commit = Commit::new(self.git, hash, &self.project);
                runner.run(&commit).map_err(|e| at_commit(e, hash))?;
            }
        }
        Ok(())
    }
}

/// Stamp the failing commit onto an action failure so the pushing user can
/// tell which of their commits was rejected.
fn at_commit(err: HookError, hash: Oid) -> HookError {
    match err {
        HookError::Action {
            action,
            reason,
            source,
        } => HookError::Action {
            action,
            reason: format!("{reason} (commit {})", hash.short()),
            source,
        },
        other => other,
    }
}
