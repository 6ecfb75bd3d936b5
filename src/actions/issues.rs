//! The issue-comment notifier.

use tracing::{debug, warn};

use crate::clients::IssueTracker;
use crate::commit::Commit;
use crate::config::ActionKind;
use crate::error::HookError;

use super::HookAction;

/// Comments on every issue the commit message references.
///
/// One unreachable issue does not stop the others: the notifier attempts
/// every key and reports the ones that failed afterwards.
pub struct IssueCommentNotifier<'c> {
    issues: &'c dyn IssueTracker,
}

impl<'c> IssueCommentNotifier<'c> {
    pub const fn new(issues: &'c dyn IssueTracker) -> Self {
        Self { issues }
    }
}

impl HookAction for IssueCommentNotifier<'_> {
    fn kind(&self) -> ActionKind {
        ActionKind::IssueCommentNotifier
    }

    fn run(&self, commit: &Commit<'_>) -> Result<(), HookError> {
        let refs = commit.issue_refs()?;
        if refs.is_empty() {
            debug!(commit = %commit.hash().short(), "no issue keys in message");
            return Ok(());
        }
        let text = format!(
            "Commit {} by {} pushed to {}:\n{}",
            commit.hash(),
            commit.author()?,
            commit.project(),
            commit.subject()?
        );
        let mut failed = Vec::new();
        for issue in refs {
            match self.issues.add_comment(issue, &text) {
                Ok(()) => debug!(issue = %issue, "commented"),
                Err(e) => {
                    warn!(issue = %issue, error = %e, "could not comment on issue");
                    failed.push(issue.as_str());
                }
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(HookError::action(
                self.kind(),
                format!("could not comment on {}", failed.join(", ")),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeIssueTracker, ScriptedGit};
    use gatehouse_git::Oid;

    fn oid() -> Oid {
        "feedfeedfeedfeedfeedfeedfeedfeedfeedfeed".parse().unwrap()
    }

    #[test]
    fn comments_on_each_referenced_issue() {
        let tracker = FakeIssueTracker::new();
        let git = ScriptedGit::with_message("WIDGET-12: fix spline\n\nAlso closes CORE-7.\n");
        let commit = Commit::new(&git, oid(), "widget");

        IssueCommentNotifier::new(&tracker).run(&commit).unwrap();

        let comments = tracker.comments.borrow();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].0, "WIDGET-12");
        assert_eq!(comments[1].0, "CORE-7");
        assert!(comments[0].1.contains("WIDGET-12: fix spline"));
        assert!(comments[0].1.contains("Test User"));
        assert!(comments[0].1.contains(&oid().to_string()));
    }

    #[test]
    fn no_issue_keys_is_fine() {
        let tracker = FakeIssueTracker::new();
        let git = ScriptedGit::with_message("chore: tidy\n");
        let commit = Commit::new(&git, oid(), "widget");

        IssueCommentNotifier::new(&tracker).run(&commit).unwrap();
        assert!(tracker.comments.borrow().is_empty());
    }

    #[test]
    fn one_failing_issue_does_not_stop_the_rest() {
        let mut tracker = FakeIssueTracker::new();
        tracker.fail_issues = vec!["WIDGET-12".to_owned()];
        let git = ScriptedGit::with_message("WIDGET-12 and CORE-7\n");
        let commit = Commit::new(&git, oid(), "widget");

        let err = IssueCommentNotifier::new(&tracker).run(&commit).unwrap_err();
        assert!(err.to_string().contains("WIDGET-12"));
        // The reachable issue was still commented on.
        assert_eq!(tracker.comments.borrow().len(), 1);
        assert_eq!(tracker.comments.borrow()[0].0, "CORE-7");
    }
}
