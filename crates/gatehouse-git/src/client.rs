//! The [`GitClient`] trait, the single abstraction boundary between the hook
//! pipeline and git.
//!
//! The pipeline interacts with the repository exclusively through this trait.
//! It is object-safe so callers can hold `&dyn GitClient` or
//! `Box<dyn GitClient>`, and small enough that tests implement it with a
//! scripted double instead of a real repository.

use std::path::Path;

use crate::error::GitError;
use crate::types::Oid;

/// The git access trait used by the hook pipeline.
///
/// The production implementation ([`CliGit`](crate::CliGit)) shells out to
/// the `git` binary. Hook processes inherit the server's environment,
/// including the pre-receive quarantine variables (`GIT_OBJECT_DIRECTORY`,
/// `GIT_ALTERNATE_OBJECT_DIRECTORIES`), so pushed-but-unreferenced objects
/// resolve exactly as they do for the receiving `git` process.
///
/// # Object safety
///
/// No generic methods, no `Self` in return position outside of `Result`.
pub trait GitClient {
    // -----------------------------------------------------------------------
    // Revision walking
    //
    // Replaces: git rev-list
    // -----------------------------------------------------------------------

    /// List the commits reachable from `new` but not from `old`, in rev-list
    /// emission order (children before parents).
    ///
    /// Replaces: `git rev-list <old>..<new>`.
    fn rev_list_between(&self, old: Oid, new: Oid) -> Result<Vec<Oid>, GitError>;

    /// List the commits reachable from `tip` but from no existing ref. Used
    /// when a push creates a ref, so commits already present on other
    /// branches are not re-examined.
    ///
    /// Replaces: `git rev-list <tip> --not --all`.
    fn rev_list_new_commits(&self, tip: Oid) -> Result<Vec<Oid>, GitError>;

    // -----------------------------------------------------------------------
    // Commit metadata
    //
    // Replaces: git show -s --format=<fmt>
    // -----------------------------------------------------------------------

    /// Render one commit through a `--format` string and return the output
    /// with trailing newlines trimmed.
    ///
    /// Replaces: `git show -s --format=<format> <revision>`.
    fn show_format(&self, revision: Oid, format: &str) -> Result<String, GitError>;

    // -----------------------------------------------------------------------
    // Repository identity
    // -----------------------------------------------------------------------

    /// The project name this repository is known by: the git directory's
    /// basename with any `.git` suffix stripped (`/srv/git/widget.git` is
    /// project `widget`).
    fn project_name(&self) -> Result<String, GitError>;

    /// The git directory this client operates on. Per-repository
    /// configuration is read from this directory.
    fn git_dir(&self) -> &Path;
}
