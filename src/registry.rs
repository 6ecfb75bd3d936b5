//! Turns configured action entries into runnable [`HookAction`] values.
//!
//! The set of actions is closed: configuration names an [`ActionKind`] tag
//! and the registry matches on it, so "is this action known" is settled by
//! the parser and "can it run here" is settled before the first action
//! executes. There is no runtime lookup of arbitrary identifiers.

use tracing::debug;

use crate::actions::{
    BuildHealthGate, BuildTrigger, CodeFreezeGate, HookAction, IssueCommentNotifier,
    ReviewAbandonNotifier, ReviewApprovalGate, ReviewMergeNotifier,
};
use crate::clients::{BuildServer, IssueTracker, ReviewServer};
use crate::config::{ActionEntry, ActionKind, ConfigError, FreezeConfig};
use crate::error::HookError;
use crate::runner::HookType;

/// Constructs actions from configuration, wiring in the external-system
/// clients they need.
///
/// Clients are optional because the system configuration may omit their
/// endpoints; an action that needs a missing client is a configuration
/// error, raised while planning rather than mid-push.
pub struct ActionRegistry<'c> {
    project: String,
    freeze: FreezeConfig,
    build: Option<&'c dyn BuildServer>,
    review: Option<&'c dyn ReviewServer>,
    issues: Option<&'c dyn IssueTracker>,
}

impl<'c> ActionRegistry<'c> {
    #[must_use]
    pub fn new(project: impl Into<String>, freeze: FreezeConfig) -> Self {
        Self {
            project: project.into(),
            freeze,
            build: None,
            review: None,
            issues: None,
        }
    }

    #[must_use]
    pub fn with_build_server(mut self, build: &'c dyn BuildServer) -> Self {
        self.build = Some(build);
        self
    }

    #[must_use]
    pub fn with_review_server(mut self, review: &'c dyn ReviewServer) -> Self {
        self.review = Some(review);
        self
    }

    #[must_use]
    pub fn with_issue_tracker(mut self, issues: &'c dyn IssueTracker) -> Self {
        self.issues = Some(issues);
        self
    }

    /// Build the ordered action plan for one hook invocation.
    ///
    /// Disabled entries are skipped without being constructed. Order is
    /// preserved from the configuration file.
    ///
    /// # Errors
    /// Returns a hard [`HookError::Config`] when an entry cannot run under
    /// `hook` or requires an endpoint the system configuration does not
    /// define.
    pub fn plan(
        &self,
        hook: HookType,
        entries: &[ActionEntry],
    ) -> Result<Vec<Box<dyn HookAction + 'c>>, HookError> {
        let mut actions = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.enabled {
                debug!(action = %entry.action, "disabled in configuration, skipping");
                continue;
            }
            actions.push(self.construct(hook, entry)?);
        }
        Ok(actions)
    }

    fn construct(
        &self,
        hook: HookType,
        entry: &ActionEntry,
    ) -> Result<Box<dyn HookAction + 'c>, HookError> {
        let action: Box<dyn HookAction + 'c> = match entry.action {
            ActionKind::BuildTrigger => Box::new(BuildTrigger::new(
                self.build_server(entry.action)?,
                entry.job_for(&self.project),
                entry.deploy_job.clone(),
            )),
            ActionKind::BuildHealthGate => Box::new(BuildHealthGate::new(
                self.build_server(entry.action)?,
                entry.job_for(&self.project),
                entry.build_fix_token().to_owned(),
            )),
            ActionKind::ReviewApprovalGate => {
                Box::new(ReviewApprovalGate::new(self.review_server(entry.action)?))
            }
            ActionKind::CodeFreezeGate => Box::new(CodeFreezeGate::new(self.freeze.clone())),
            ActionKind::ReviewMergeNotifier => {
                post_receive_only(hook, entry.action)?;
                Box::new(ReviewMergeNotifier::new(self.review_server(entry.action)?))
            }
            ActionKind::ReviewAbandonNotifier => {
                post_receive_only(hook, entry.action)?;
                Box::new(ReviewAbandonNotifier::new(self.review_server(entry.action)?))
            }
            ActionKind::IssueCommentNotifier => {
                post_receive_only(hook, entry.action)?;
                Box::new(IssueCommentNotifier::new(self.issue_tracker(entry.action)?))
            }
        };
        Ok(action)
    }

    fn build_server(&self, action: ActionKind) -> Result<&'c dyn BuildServer, HookError> {
        self.build.ok_or_else(|| missing_endpoint(action, "jenkins"))
    }

    fn review_server(&self, action: ActionKind) -> Result<&'c dyn ReviewServer, HookError> {
        self.review.ok_or_else(|| missing_endpoint(action, "gerrit"))
    }

    fn issue_tracker(&self, action: ActionKind) -> Result<&'c dyn IssueTracker, HookError> {
        self.issues.ok_or_else(|| missing_endpoint(action, "jira"))
    }
}

fn missing_endpoint(action: ActionKind, section: &str) -> HookError {
    HookError::Config(ConfigError {
        path: None,
        message: format!("{action} requires [{section}] in the system configuration"),
    })
}

fn post_receive_only(hook: HookType, action: ActionKind) -> Result<(), HookError> {
    if hook == HookType::PostReceive {
        return Ok(());
    }
    Err(HookError::Config(ConfigError {
        path: None,
        message: format!("{action} is a post-receive action and cannot run during {hook}"),
    }))
}
