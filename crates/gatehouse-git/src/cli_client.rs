//! CLI-backed [`GitClient`] implementation.
//!
//! Shells out to the `git` binary with the hook process's inherited
//! environment. During pre-receive the server exports quarantine variables
//! (`GIT_OBJECT_DIRECTORY` and friends) that only the real `git` binary is
//! guaranteed to honor, which is why this backend spawns processes instead of
//! reading the object store directly.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::client::GitClient;
use crate::error::GitError;
use crate::types::Oid;

/// A [`GitClient`] backed by the `git` command-line tool.
pub struct CliGit {
    /// The git directory commands run in. For server-side hooks this is the
    /// bare repository root.
    git_dir: PathBuf,
}

impl CliGit {
    /// Create a client operating on the given git directory.
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        Self {
            git_dir: git_dir.into(),
        }
    }

    /// Create a client from the hook environment.
    ///
    /// git runs receive hooks with the current directory set to the git
    /// directory and may also export `GIT_DIR`; the variable wins when
    /// present.
    pub fn from_env() -> Result<Self, GitError> {
        let dir = match std::env::var_os("GIT_DIR") {
            Some(d) => PathBuf::from(d),
            None => std::env::current_dir().map_err(GitError::Io)?,
        };
        if !dir.is_dir() {
            return Err(GitError::Repository {
                message: format!("git directory {} does not exist", dir.display()),
            });
        }
        Ok(Self::new(dir))
    }

    /// Run a git command and return its stdout.
    fn git_stdout(&self, args: &[&str]) -> Result<String, GitError> {
        debug!(command = %format!("git {}", args.join(" ")), "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.git_dir)
            .output()
            .map_err(GitError::Io)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                exit_code: output.status.code(),
            })
        }
    }

    /// Parse `git rev-list` output into OIDs, preserving line order.
    fn parse_oid_lines(output: &str) -> Result<Vec<Oid>, GitError> {
        output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.parse::<Oid>().map_err(GitError::from))
            .collect()
    }
}

impl GitClient for CliGit {
    fn rev_list_between(&self, old: Oid, new: Oid) -> Result<Vec<Oid>, GitError> {
        let range = format!("{old}..{new}");
        let out = self.git_stdout(&["rev-list", &range])?;
        Self::parse_oid_lines(&out)
    }

    fn rev_list_new_commits(&self, tip: Oid) -> Result<Vec<Oid>, GitError> {
        let tip = tip.to_string();
        let out = self.git_stdout(&["rev-list", &tip, "--not", "--all"])?;
        Self::parse_oid_lines(&out)
    }

    fn show_format(&self, revision: Oid, format: &str) -> Result<String, GitError> {
        let format_arg = format!("--format={format}");
        let revision = revision.to_string();
        let out = self.git_stdout(&["show", "-s", &format_arg, &revision])?;
        Ok(out.trim_end_matches('\n').to_owned())
    }

    fn project_name(&self) -> Result<String, GitError> {
        let dir = self
            .git_dir
            .canonicalize()
            .map_err(|e| GitError::Repository {
                message: format!("cannot resolve {}: {e}", self.git_dir.display()),
            })?;
        project_name_from_dir(&dir).ok_or_else(|| GitError::Repository {
            message: format!("cannot derive a project name from {}", dir.display()),
        })
    }

    fn git_dir(&self) -> &Path {
        &self.git_dir
    }
}

/// Derive a project name from a git directory path.
///
/// Bare repositories are named by their directory (`widget.git` -> `widget`);
/// a non-bare `.git` directory takes the name of its parent.
fn project_name_from_dir(dir: &Path) -> Option<String> {
    let base = dir.file_name()?.to_str()?;
    if base == ".git" {
        let parent = dir.parent()?.file_name()?.to_str()?;
        return Some(parent.to_owned());
    }
    Some(base.strip_suffix(".git").unwrap_or(base).to_owned())
}
