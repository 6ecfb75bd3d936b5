//! Blocking JIRA client.

use std::time::Duration;

use super::{ClientError, IssueTracker};
use crate::config::JiraConfig;

const SYSTEM: &str = "jira";

/// JIRA over its REST API (v2 comment endpoint).
pub struct JiraHttp {
    base: String,
    user: Option<String>,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl JiraHttp {
    /// Build a client from the `[jira]` system configuration section.
    ///
    /// # Errors
    /// Returns [`ClientError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(cfg: &JiraConfig) -> Result<Self, ClientError> {
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
}

impl IssueTracker for JiraHttp {
    fn add_comment(&self, issue: &str, text: &str) -> Result<(), ClientError> {
        let url = format!("{}/rest/api/2/issue/{issue}/comment", self.base);
        let payload = serde_json::json!({ "body": text });
        let mut req = self.client.post(url).json(&payload);
        if let Some(user) = &self.user {
            req = req.basic_auth(user, self.token.as_deref());
        }
        let response = req.send().map_err(|source| ClientError::Http {
            system: SYSTEM,
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                system: SYSTEM,
                status: status.as_u16(),
                detail: format!("commenting on {issue}"),
            });
        }
        Ok(())
    }
}
