//! Actions backed by the build server: submitting builds and gating pushes
//! on build health.

use tracing::{debug, info};

use crate::clients::BuildServer;
use crate::commit::Commit;
use crate::config::ActionKind;
use crate::error::HookError;

use super::directives;
use super::HookAction;

// --- build trigger --------------------------------------------------------

/// Submits a build for every pushed commit.
///
/// Honors two commit-message directives: `{nobuild: "reason"}` skips the
/// submission for that commit, `{deploy}` routes to the deploy job instead
/// of the default one and sets the `DEPLOY=true` parameter.
pub struct BuildTrigger<'c> {
    build: &'c dyn BuildServer,
    job: String,
    deploy_job: Option<String>,
}

impl<'c> BuildTrigger<'c> {
    pub fn new(build: &'c dyn BuildServer, job: String, deploy_job: Option<String>) -> Self {
        Self {
            build,
            job,
            deploy_job,
        }
    }
}

impl HookAction for BuildTrigger<'_> {
    fn kind(&self) -> ActionKind {
        ActionKind::BuildTrigger
    }

    fn run(&self, commit: &Commit<'_>) -> Result<(), HookError> {
        let message = commit.message()?;
        if let Some(reason) = directives::nobuild_reason(message) {
            info!(commit = %commit.hash().short(), reason, "nobuild directive, not submitting");
            return Ok(());
        }

        let mut params = vec![
            ("GIT_HASH".to_owned(), commit.hash().to_string()),
            ("Project_Name".to_owned(), commit.project().to_owned()),
            ("Requested_By".to_owned(), commit.author()?.to_owned()),
        ];
        let job = if directives::wants_deploy(message) {
            let Some(deploy_job) = &self.deploy_job else {
                return Err(HookError::action(
                    self.kind(),
                    "commit requests {deploy} but no deploy_job is configured",
                ));
            };
            params.push(("DEPLOY".to_owned(), "true".to_owned()));
            deploy_job
        } else {
            &self.job
        };

        match self.build.start(job, &params) {
            Ok(queued) => {
                info!(
                    job = %job,
                    queued = %queued,
                    commit = %commit.hash().short(),
                    "build submitted"
                );
                Ok(())
            }
            Err(e) => Err(HookError::action_with_cause(
                self.kind(),
                format!("could not submit build job {job}"),
                e,
            )),
        }
    }
}

// --- build health gate ------------------------------------------------------

/// Rejects commits while the project's build job is unhealthy.
///
/// A commit whose subject carries the configured fix token is let through so
/// the fix itself can land.
pub struct BuildHealthGate<'c> {
    build: &'c dyn BuildServer,
    job: String,
    fix_token: String,
}

impl<'c> BuildHealthGate<'c> {
    pub fn new(build: &'c dyn BuildServer, job: String, fix_token: String) -> Self {
        Self {
            build,
            job,
            fix_token,
        }
    }
}

impl HookAction for BuildHealthGate<'_> {
    fn kind(&self) -> ActionKind {
        ActionKind::BuildHealthGate
    }

    fn run(&self, commit: &Commit<'_>) -> Result<(), HookError> {
        let healthy = self.build.is_healthy(&self.job).map_err(|e| {
            HookError::action_with_cause(
                self.kind(),
                format!("could not query health of job {}", self.job),
                e,
            )
        })?;
        if healthy {
            debug!(job = %self.job, "job is healthy");
            return Ok(());
        }
        if commit.subject()?.contains(&self.fix_token) {
            info!(
                job = %self.job,
                commit = %commit.hash().short(),
                "job is unhealthy but commit carries the fix token"
            );
            return Ok(());
        }
        Err(HookError::action(
            self.kind(),
            format!(
                "job {} is not healthy and the commit does not claim to fix it",
                self.job
            ),
        ))
    }
}
