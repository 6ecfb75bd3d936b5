//! Blocking Jenkins client.

use std::time::Duration;

use serde::Deserialize;

use super::{BuildServer, ClientError};
use crate::config::JenkinsConfig;

const SYSTEM: &str = "jenkins";

/// Jenkins over its JSON remote-access API.
pub struct JenkinsHttp {
    base: String,
    user: Option<String>,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl JenkinsHttp {
    /// Build a client from the `[jenkins]` system configuration section.
    ///
    /// # Errors
    /// Returns [`ClientError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(cfg: &JenkinsConfig) -> Result<Self, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()
            .map_err(|source| ClientError::Http {
                system: SYSTEM,
                source,
            })?;
        Ok(Self {
            base: cfg.url.trim_end_matches('/').to_owned(),
            user: cfg.user.clone(),
            token: cfg.token.clone(),
            client,
        })
    }

    fn authed(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.user {
            Some(user) => req.basic_auth(user, self.token.as_deref()),
            None => req,
        }
    }
}

/// Subset of `/job/<name>/api/json` the health check reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    last_completed_build: Option<BuildRef>,
    last_successful_build: Option<BuildRef>,
}

#[derive(Debug, Deserialize)]
struct BuildRef {
    number: u64,
}

/// A job is healthy when its newest finished build succeeded.
fn job_is_healthy(status: &JobStatus) -> bool {
    match (&status.last_completed_build, &status.last_successful_build) {
        // Nothing has run yet; do not hold pushes hostage to an idle job.
        (None, _) => true,
        (Some(completed), Some(successful)) => completed.number == successful.number,
        (Some(_), None) => false,
    }
}

impl BuildServer for JenkinsHttp {
    fn is_healthy(&self, job: &str) -> Result<bool, ClientError> {
        let url = format!(
            "{}/job/{job}/api/json?tree=lastCompletedBuild[number],lastSuccessfulBuild[number]",
            self.base
        );
        let response = self
            .authed(self.client.get(url))
            .send()
            .map_err(|source| ClientError::Http {
                system: SYSTEM,
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                system: SYSTEM,
                status: status.as_u16(),
                detail: format!("querying job {job}"),
            });
        }
        let job_status: JobStatus = response.json().map_err(|e| ClientError::Payload {
            system: SYSTEM,
            detail: e.to_string(),
        })?;
        Ok(job_is_healthy(&job_status))
    }

    fn start(&self, job: &str, params: &[(String, String)]) -> Result<String, ClientError> {
        let url = format!("{}/job/{job}/buildWithParameters", self.base);
        let response = self
            .authed(self.client.post(url).query(params))
            .send()
            .map_err(|source| ClientError::Http {
                system: SYSTEM,
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                system: SYSTEM,
                status: status.as_u16(),
                detail: format!("submitting job {job}"),
            });
        }
        // Jenkins answers 201 with the queue item in the Location header.
        let queued = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_owned();
        Ok(queued)
    }
}
