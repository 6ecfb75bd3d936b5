//! Scripted test doubles shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;

use gatehouse_git::{GitClient, GitError, Oid};

use crate::clients::{BuildServer, ClientError, IssueTracker, ReviewRecord, ReviewServer};

/// A [`GitClient`] that answers from canned data and counts every call.
pub(crate) struct ScriptedGit {
    message: String,
    author: String,
    fail_show: bool,
    rev_list_response: Vec<Oid>,
    show_calls: RefCell<HashMap<String, usize>>,
    rev_list_calls: Cell<usize>,
}

impl ScriptedGit {
    pub(crate) fn with_message(message: &str) -> Self {
        Self {
            message: message.to_owned(),
            author: "Test User".to_owned(),
            fail_show: false,
            rev_list_response: Vec::new(),
            show_calls: RefCell::new(HashMap::new()),
            rev_list_calls: Cell::new(0),
        }
    }

    /// Every `show_format` call fails, as if the repository were unreadable.
    pub(crate) fn failing() -> Self {
        let mut double = Self::with_message("");
        double.fail_show = true;
        double
    }

    pub(crate) fn with_rev_list(oids: Vec<Oid>) -> Self {
        let mut double = Self::with_message("scripted commit\n");
        double.rev_list_response = oids;
        double
    }

    pub(crate) fn with_message_and_rev_list(message: &str, oids: Vec<Oid>) -> Self {
        let mut double = Self::with_message(message);
        double.rev_list_response = oids;
        double
    }

    pub(crate) fn show_calls_for(&self, format: &str) -> usize {
        self.show_calls.borrow().get(format).copied().unwrap_or(0)
    }

    pub(crate) fn rev_list_calls(&self) -> usize {
        self.rev_list_calls.get()
    }
}

impl GitClient for ScriptedGit {
    fn rev_list_between(&self, _old: Oid, _new: Oid) -> Result<Vec<Oid>, GitError> {
        self.rev_list_calls.set(self.rev_list_calls.get() + 1);
        Ok(self.rev_list_response.clone())
    }

    fn rev_list_new_commits(&self, _tip: Oid) -> Result<Vec<Oid>, GitError> {
        self.rev_list_calls.set(self.rev_list_calls.get() + 1);
        Ok(self.rev_list_response.clone())
    }

    fn show_format(&self, _revision: Oid, format: &str) -> Result<String, GitError> {
        *self
            .show_calls
            .borrow_mut()
            .entry(format.to_owned())
            .or_insert(0) += 1;
        if self.fail_show {
            return Err(GitError::CommandFailed {
                command: format!("git show -s --format={format}"),
                stderr: "fatal: scripted failure".to_owned(),
                exit_code: Some(128),
            });
        }
        let out = match format {
            "%B" => self.message.clone(),
            "%s" => self.message.lines().next().unwrap_or("").to_owned(),
            "%an" => self.author.clone(),
            _ => String::new(),
        };
        Ok(out.trim_end_matches('\n').to_owned())
    }

    fn project_name(&self) -> Result<String, GitError> {
        Ok("widget".to_owned())
    }

    fn git_dir(&self) -> &Path {
        Path::new(".")
    }
}

// --- external-service fakes ----------------------------------------------

fn scripted_failure(system: &'static str) -> ClientError {
    ClientError::Payload {
        system,
        detail: "scripted failure".to_owned(),
    }
}

/// A [`BuildServer`] with a fixed health answer that records submissions.
pub(crate) struct FakeBuildServer {
    pub(crate) healthy: bool,
    pub(crate) fail: bool,
    pub(crate) started: RefCell<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeBuildServer {
    pub(crate) fn healthy() -> Self {
        Self {
            healthy: true,
            fail: false,
            started: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn unhealthy() -> Self {
        let mut server = Self::healthy();
        server.healthy = false;
        server
    }

    /// Every call fails, as if the server were unreachable.
    pub(crate) fn unreachable() -> Self {
        let mut server = Self::healthy();
        server.fail = true;
        server
    }
}

impl BuildServer for FakeBuildServer {
    fn is_healthy(&self, _job: &str) -> Result<bool, ClientError> {
        if self.fail {
            return Err(scripted_failure("jenkins"));
        }
        Ok(self.healthy)
    }

    fn start(&self, job: &str, params: &[(String, String)]) -> Result<String, ClientError> {
        if self.fail {
            return Err(scripted_failure("jenkins"));
        }
        self.started
            .borrow_mut()
            .push((job.to_owned(), params.to_vec()));
        Ok("queue/1".to_owned())
    }
}

/// A [`ReviewServer`] that answers queries from a canned list and records
/// every call.
pub(crate) struct FakeReviewServer {
    pub(crate) approved: Vec<ReviewRecord>,
    /// When set, only this commit gets the canned answer; every other query
    /// returns no records.
    pub(crate) approve_only: Option<Oid>,
    pub(crate) fail: bool,
    pub(crate) queries: RefCell<Vec<(String, Oid)>>,
    pub(crate) merged: RefCell<Vec<(String, Oid)>>,
    pub(crate) abandoned: RefCell<Vec<(String, String)>>,
}

impl FakeReviewServer {
    pub(crate) fn with_approved(approved: Vec<ReviewRecord>) -> Self {
        Self {
            approved,
            approve_only: None,
            fail: false,
            queries: RefCell::new(Vec::new()),
            merged: RefCell::new(Vec::new()),
            abandoned: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn unreachable() -> Self {
        let mut server = Self::with_approved(Vec::new());
        server.fail = true;
        server
    }
}

impl ReviewServer for FakeReviewServer {
    fn query_approved(
        &self,
        change_id: &str,
        commit: Oid,
    ) -> Result<Vec<ReviewRecord>, ClientError> {
        self.queries
            .borrow_mut()
            .push((change_id.to_owned(), commit));
        if self.fail {
            return Err(scripted_failure("gerrit"));
        }
        if let Some(only) = self.approve_only {
            if commit != only {
                return Ok(Vec::new());
            }
        }
        Ok(self.approved.clone())
    }

    fn mark_merged(&self, change_id: &str, commit: Oid) -> Result<(), ClientError> {
        if self.fail {
            return Err(scripted_failure("gerrit"));
        }
        self.merged.borrow_mut().push((change_id.to_owned(), commit));
        Ok(())
    }

    fn abandon(&self, change_id: &str, reason: &str) -> Result<(), ClientError> {
        if self.fail {
            return Err(scripted_failure("gerrit"));
        }
        self.abandoned
            .borrow_mut()
            .push((change_id.to_owned(), reason.to_owned()));
        Ok(())
    }
}

/// An [`IssueTracker`] that records comments and can fail per issue key.
pub(crate) struct FakeIssueTracker {
    pub(crate) fail_issues: Vec<String>,
    pub(crate) comments: RefCell<Vec<(String, String)>>,
}

impl FakeIssueTracker {
    pub(crate) fn new() -> Self {
        Self {
            fail_issues: Vec::new(),
            comments: RefCell::new(Vec::new()),
        }
    }
}

impl IssueTracker for FakeIssueTracker {
    fn add_comment(&self, issue: &str, text: &str) -> Result<(), ClientError> {
        if self.fail_issues.iter().any(|k| k == issue) {
            return Err(scripted_failure("jira"));
        }
        self.comments
            .borrow_mut()
            .push((issue.to_owned(), text.to_owned()));
        Ok(())
    }
}
