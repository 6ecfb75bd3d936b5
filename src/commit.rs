//! The commit abstraction handed to hook actions.
//!
//! A [`Commit`] wraps one pushed revision and fetches metadata on demand
//! through the [`GitClient`] trait. Every derived field is computed at most
//! once per instance: actions later in the chain reuse what earlier actions
//! already paid for, and a pipeline run never re-issues the same git command
//! for the same commit.

use std::cell::OnceCell;
use std::sync::LazyLock;

use gatehouse_git::{GitClient, Oid};
use regex::Regex;

use crate::error::HookError;

/// Issue-tracker keys as they appear in commit messages (`WIDGET-123`).
static ISSUE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][A-Z0-9]+-[0-9]+\b").expect("issue key pattern is valid")
});

/// One pushed commit, with lazily fetched metadata.
///
/// Owned by the runner invocation for a single hash and discarded when the
/// actions for that hash complete. Holds a shared reference to the git
/// client; it never mutates repository state.
pub struct Commit<'a> {
    git: &'a dyn GitClient,
    hash: Oid,
    project: String,
    message: OnceCell<String>,
    subject: OnceCell<String>,
    author: OnceCell<String>,
    change_id: OnceCell<Option<String>>,
    issue_refs: OnceCell<Vec<String>>,
}

impl<'a> Commit<'a> {
    /// Wrap `hash` as a commit of `project`.
    pub fn new(git: &'a dyn GitClient, hash: Oid, project: impl Into<String>) -> Self {
        Self {
            git,
            hash,
            project: project.into(),
            message: OnceCell::new(),
            subject: OnceCell::new(),
            author: OnceCell::new(),
            change_id: OnceCell::new(),
            issue_refs: OnceCell::new(),
        }
    }

    /// The commit hash.
    #[must_use]
    pub const fn hash(&self) -> Oid {
        self.hash
    }

    /// The project this commit was pushed to.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Full commit message body.
    ///
    /// # Errors
    /// Returns [`HookError::Git`] if the underlying git command fails.
    pub fn message(&self) -> Result<&str, HookError> {
        if let Some(m) = self.message.get() {
            return Ok(m);
        }
        let fetched = self.git.show_format(self.hash, "%B")?;
        Ok(self.message.get_or_init(|| fetched))
    }

    /// First line of the commit message.
    ///
    /// # Errors
    /// Returns [`HookError::Git`] if the underlying git command fails.
    pub fn subject(&self) -> Result<&str, HookError> {
        if let Some(s) = self.subject.get() {
            return Ok(s);
        }
        let fetched = self.git.show_format(self.hash, "%s")?;
        Ok(self.subject.get_or_init(|| fetched))
    }

    /// Author name (`%an`).
    ///
    /// # Errors
    /// Returns [`HookError::Git`] if the underlying git command fails.
    pub fn author(&self) -> Result<&str, HookError> {
        if let Some(a) = self.author.get() {
            return Ok(a);
        }
        let fetched = self.git.show_format(self.hash, "%an")?;
        Ok(self.author.get_or_init(|| fetched))
    }

    /// The `Change-Id:` trailer, if the message carries one.
    ///
    /// Absence is an ordinary condition here: gates that require a Change-Id
    /// turn `None` into a failure, notifiers log and move on.
    ///
    /// # Errors
    /// Returns [`HookError::Git`] if fetching the message fails.
    pub fn change_id(&self) -> Result<Option<&str>, HookError> {
        if let Some(cached) = self.change_id.get() {
            return Ok(cached.as_deref());
        }
        let parsed = parse_change_id(self.message()?);
        Ok(self.change_id.get_or_init(|| parsed).as_deref())
    }

    /// Issue keys referenced by the message, first-seen order, deduplicated.
    ///
    /// Never fails on "no keys found"; an unparseable message simply yields
    /// an empty list.
    ///
    /// # Errors
    /// Returns [`HookError::Git`] if fetching the message fails.
    pub fn issue_refs(&self) -> Result<&[String], HookError> {
        if let Some(cached) = self.issue_refs.get() {
            return Ok(cached);
        }
        let parsed = parse_issue_refs(self.message()?);
        Ok(self.issue_refs.get_or_init(|| parsed))
    }
}

/// Extract the value of the last `Change-Id:` trailer line.
fn parse_change_id(message: &str) -> Option<String> {
    message
        .lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix("Change-Id:"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

fn parse_issue_refs(message: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in ISSUE_KEY.find_iter(message) {
        let key = m.as_str();
        if !seen.iter().any(|s| s == key) {
            seen.push(key.to_owned());
        }
    }
    seen
}
