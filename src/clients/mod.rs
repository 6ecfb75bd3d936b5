//! External-system collaborators.
//!
//! The pipeline core only ever sees these traits; the blocking HTTP
//! implementations here are the production wiring. Actions wrap every
//! [`ClientError`] into their own failure with context, so nothing above
//! this module matches on HTTP details.
//!
//! None of the clients retry. A hook invocation is short-lived; each request
//! carries the fixed timeout from the system configuration and one failure
//! fails the calling action.

use gatehouse_git::Oid;
use thiserror::Error;

mod gerrit;
mod jenkins;
mod jira;

pub use gerrit::GerritHttp;
pub use jenkins::JenkinsHttp;
pub use jira::JiraHttp;

/// Errors from external-system clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never completed (connect, timeout, TLS, ...).
    #[error("request to {system} failed: {source}")]
    Http {
        /// Which system was called.
        system: &'static str,
        /// Transport-level cause.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{system} returned HTTP {status}: {detail}")]
    Status {
        /// Which system was called.
        system: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body excerpt or status text.
        detail: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {system}: {detail}")]
    Payload {
        /// Which system was called.
        system: &'static str,
        /// What was wrong.
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A Jenkins-shaped build server.
pub trait BuildServer {
    /// `true` when `job`'s last completed build is its last successful one.
    ///
    /// A job with no builds yet counts as healthy.
    ///
    /// # Errors
    /// Returns [`ClientError`] when the server cannot be reached or answers
    /// unexpectedly.
    fn is_healthy(&self, job: &str) -> Result<bool, ClientError>;

    /// Enqueue a parameterized build of `job`. Returns an opaque identifier
    /// for the queued build (the queue URL for Jenkins).
    ///
    /// # Errors
    /// Returns [`ClientError`] when the server rejects the submission.
    fn start(&self, job: &str, params: &[(String, String)]) -> Result<String, ClientError>;
}

/// One review matching a Change-Id query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRecord {
    /// The server's numeric change identifier.
    pub number: u64,
    /// The Change-Id the record was found under.
    pub change_id: String,
}

/// A Gerrit-shaped review server.
pub trait ReviewServer {
    /// Find approved, open reviews whose Change-Id is `change_id` and whose
    /// current revision is `commit`. More than one match is possible and the
    /// caller decides whether that is acceptable.
    ///
    /// # Errors
    /// Returns [`ClientError`] when the query cannot be completed.
    fn query_approved(
        &self,
        change_id: &str,
        commit: Oid,
    ) -> Result<Vec<ReviewRecord>, ClientError>;

    /// Record on the review that `commit` has landed.
    ///
    /// # Errors
    /// Returns [`ClientError`] when the update is rejected.
    fn mark_merged(&self, change_id: &str, commit: Oid) -> Result<(), ClientError>;

    /// Abandon the open review for `change_id`, with a reason shown on the
    /// review.
    ///
    /// # Errors
    /// Returns [`ClientError`] when the update is rejected.
    fn abandon(&self, change_id: &str, reason: &str) -> Result<(), ClientError>;
}

/// A JIRA-shaped issue tracker.
pub trait IssueTracker {
    /// Append a comment to `issue` (e.g. `WIDGET-12`).
    ///
    /// # Errors
    /// Returns [`ClientError`] when the tracker rejects the comment.
    fn add_comment(&self, issue: &str, text: &str) -> Result<(), ClientError>;
}
