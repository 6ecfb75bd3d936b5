//! Actions backed by the review server.
//!
//! The approval gate enforces review before a push lands; the notifiers keep
//! review state in sync after it has landed. All three correlate commits to
//! reviews through the `Change-Id:` trailer.

use tracing::{debug, info};

use crate::clients::ReviewServer;
use crate::commit::Commit;
use crate::config::ActionKind;
use crate::error::HookError;

use super::HookAction;

// --- approval gate ----------------------------------------------------------

/// Rejects commits that do not correspond to exactly one approved, open
/// review.
pub struct ReviewApprovalGate<'c> {
    review: &'c dyn ReviewServer,
}

impl<'c> ReviewApprovalGate<'c> {
    pub const fn new(review: &'c dyn ReviewServer) -> Self {
        Self { review }
    }
}

impl HookAction for ReviewApprovalGate<'_> {
    fn kind(&self) -> ActionKind {
        ActionKind::ReviewApprovalGate
    }

    fn run(&self, commit: &Commit<'_>) -> Result<(), HookError> {
        let Some(change_id) = commit.change_id()? else {
            return Err(HookError::action(
                self.kind(),
                "commit has no Change-Id trailer, approval cannot be verified",
            ));
        };
        let records = self
            .review
            .query_approved(change_id, commit.hash())
            .map_err(|e| {
                HookError::action_with_cause(
                    self.kind(),
                    format!("could not query reviews for {change_id}"),
                    e,
                )
            })?;
        match records.as_slice() {
            [record] => {
                debug!(change = record.number, "approved review found");
                Ok(())
            }
            [] => Err(HookError::action(
                self.kind(),
                format!("no approved review found for Change-Id {change_id}"),
            )),
            _ => Err(HookError::action(
                self.kind(),
                format!(
                    "{} open reviews match Change-Id {change_id}, refusing the ambiguous match",
                    records.len()
                ),
            )),
        }
    }
}

// --- merge notifier -----------------------------------------------------------

/// Marks the commit's review as merged once the push has been accepted.
pub struct ReviewMergeNotifier<'c> {
    review: &'c dyn ReviewServer,
}

impl<'c> ReviewMergeNotifier<'c> {
    pub const fn new(review: &'c dyn ReviewServer) -> Self {
        Self { review }
    }
}

impl HookAction for ReviewMergeNotifier<'_> {
    fn kind(&self) -> ActionKind {
        ActionKind::ReviewMergeNotifier
    }

    fn run(&self, commit: &Commit<'_>) -> Result<(), HookError> {
        let Some(change_id) = commit.change_id()? else {
            info!(commit = %commit.hash().short(), "no Change-Id, no review to mark merged");
            return Ok(());
        };
        self.review
            .mark_merged(change_id, commit.hash())
            .map_err(|e| {
                HookError::action_with_cause(
                    self.kind(),
                    format!("could not mark {change_id} merged"),
                    e,
                )
            })?;
        info!(change_id, commit = %commit.hash().short(), "review marked merged");
        Ok(())
    }
}

// --- abandon notifier ----------------------------------------------------------

/// Abandons the commit's open review. Configured on projects where pushes
/// supersede the review rather than complete it.
pub struct ReviewAbandonNotifier<'c> {
    review: &'c dyn ReviewServer,
}

impl<'c> ReviewAbandonNotifier<'c> {
    pub const fn new(review: &'c dyn ReviewServer) -> Self {
        Self { review }
    }
}

impl HookAction for ReviewAbandonNotifier<'_> {
    fn kind(&self) -> ActionKind {
        ActionKind::ReviewAbandonNotifier
    }

    fn run(&self, commit: &Commit<'_>) -> Result<(), HookError> {
        let Some(change_id) = commit.change_id()? else {
            info!(commit = %commit.hash().short(), "no Change-Id, no review to abandon");
            return Ok(());
        };
        let reason = format!(
            "Superseded by commit {} pushed directly to {}.",
            commit.hash().short(),
            commit.project()
        );
        self.review.abandon(change_id, &reason).map_err(|e| {
            HookError::action_with_cause(
                self.kind(),
                format!("could not abandon {change_id}"),
                e,
            )
        })?;
        info!(change_id, commit = %commit.hash().short(), "review abandoned");
        Ok(())
    }
}
