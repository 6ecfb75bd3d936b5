//! Push update-stream parsing and commit expansion.
//!
//! git invokes receive hooks with zero or more lines of
//! `"<old> <new> <refname>"` on stdin, one per updated ref. The walker turns
//! that stream into the list of individual commits the runner will examine:
//! parse, drop refs outside the watch-list, then expand each surviving
//! update through `rev-list`.
//!
//! Filtering happens before expansion, so an unwatched ref never costs a
//! git call.

use std::io::BufRead;

use gatehouse_git::{GitClient, Oid};
use tracing::info;

use crate::error::HookError;

// ---------------------------------------------------------------------------
// RefUpdate
// ---------------------------------------------------------------------------

/// One parsed update line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefUpdate {
    /// The ref's value before the push. Zero when the push creates the ref.
    pub old: Oid,
    /// The ref's value after the push. Zero when the push deletes the ref.
    pub new: Oid,
    /// Fully qualified ref name (`refs/heads/main`).
    pub ref_name: String,
}

impl RefUpdate {
    /// Parse a single `"<old> <new> <refname>"` line.
    ///
    /// # Errors
    /// Returns [`HookError::Protocol`] when the line does not have three
    /// space-separated fields or a hash field is not 40 hex characters.
    pub fn parse(line: &str) -> Result<Self, HookError> {
        let mut fields = line.trim_end_matches(['\r', '\n']).splitn(3, ' ');
        let (Some(old), Some(new), Some(ref_name)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(HookError::Protocol {
                message: format!("expected \"<old> <new> <refname>\", got {line:?}"),
            });
        };
        if ref_name.is_empty() {
            return Err(HookError::Protocol {
                message: format!("empty ref name in {line:?}"),
            });
        }
        let old: Oid = old.parse().map_err(|e| HookError::Protocol {
            message: format!("old hash: {e}"),
        })?;
        let new: Oid = new.parse().map_err(|e| HookError::Protocol {
            message: format!("new hash: {e}"),
        })?;
        Ok(Self {
            old,
            new,
            ref_name: ref_name.to_owned(),
        })
    }

    /// The push creates this ref.
    #[must_use]
    pub fn is_create(&self) -> bool {
        self.old.is_zero()
    }

    /// The push deletes this ref.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.new.is_zero()
    }
}

// ---------------------------------------------------------------------------
// RevisionWalker
// ---------------------------------------------------------------------------

/// Parses the update stream and expands watched updates into commits.
pub struct RevisionWalker<'a> {
    git: &'a dyn GitClient,
    watch_refs: &'a [String],
}

impl<'a> RevisionWalker<'a> {
    /// Create a walker filtering on `watch_refs`.
    pub const fn new(git: &'a dyn GitClient, watch_refs: &'a [String]) -> Self {
        Self { git, watch_refs }
    }

    /// Parse every update line from `input`, keeping only watched refs.
    ///
    /// Unwatched refs are logged at info level and dropped; they are not an
    /// error and never reach [`expand`](Self::expand). Blank lines are
    /// ignored.
    ///
    /// # Errors
    /// Returns [`HookError::Protocol`] on a malformed line.
    pub fn parse(&self, input: impl BufRead) -> Result<Vec<RefUpdate>, HookError> {
        let mut updates = Vec::new();
        for line in input.lines() {
            let line = line.map_err(|e| HookError::Protocol {
                message: format!("could not read stdin: {e}"),
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let update = RefUpdate::parse(&line)?;
            if self.watch_refs.iter().any(|r| r == &update.ref_name) {
                updates.push(update);
            } else {
                info!(ref_name = %update.ref_name, "ref not on watch-list, skipping");
            }
        }
        Ok(updates)
    }

    /// Expand one watched update into the commits it introduces.
    ///
    /// The commits come back in the order `git rev-list` emits them:
    /// children before parents, so for a linear push the newest commit is
    /// first. Callers must not assume chronological order.
    ///
    /// - Deletions introduce nothing and expand to an empty list.
    /// - Creations are expanded with `rev-list <new> --not --all`, so only
    ///   commits not already reachable from some other ref are examined.
    /// - Everything else is plain `rev-list <old>..<new>`.
    ///
    /// # Errors
    /// Returns [`HookError::Git`] when rev-list fails (for example when the
    /// pushed objects are missing).
    pub fn expand(&self, update: &RefUpdate) -> Result<Vec<Oid>, HookError> {
        if update.is_delete() {
            info!(ref_name = %update.ref_name, "ref deletion, nothing to inspect");
            return Ok(Vec::new());
        }
        let commits = if update.is_create() {
            self.git.rev_list_new_commits(update.new)?
        } else {
            self.git.rev_list_between(update.old, update.new)?
        };
        Ok(commits)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
