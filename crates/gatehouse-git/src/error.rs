//! Error types for git operations.
//!
//! [`GitError`] is the single error type returned by all [`GitClient`](crate::GitClient)
//! trait methods. It uses rich enum variants so callers can match on specific
//! failure modes without parsing error messages.

use thiserror::Error;

use crate::types::OidParseError;

/// Errors returned by [`GitClient`](crate::GitClient) operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// A `git` subprocess exited non-zero.
    #[error("`{command}` failed{}", command_detail(.exit_code, .stderr))]
    CommandFailed {
        /// The full command line that was run (e.g., `git rev-list a..b`).
        command: String,
        /// Captured stderr, trimmed.
        stderr: String,
        /// Exit code, if the process terminated normally.
        exit_code: Option<i32>,
    },

    /// Output from a git command could not be parsed as an object id.
    #[error("invalid OID `{value}`: {reason}")]
    InvalidOid {
        /// The raw value that failed validation.
        value: String,
        /// Why validation failed.
        reason: String,
    },

    /// The repository path could not be resolved.
    #[error("not a usable repository: {message}")]
    Repository {
        /// What went wrong while locating the git directory.
        message: String,
    },

    /// An I/O error occurred (process spawn, file system).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn command_detail(exit_code: &Option<i32>, stderr: &str) -> String {
    let mut detail = String::new();
    if let Some(code) = exit_code {
        detail.push_str(&format!(" (exit code {code})"));
    }
    if !stderr.is_empty() {
        detail.push_str(&format!(": {stderr}"));
    }
    detail
}

impl From<OidParseError> for GitError {
    fn from(e: OidParseError) -> Self {
        Self::InvalidOid {
            value: e.value,
            reason: e.reason,
        }
    }
}
