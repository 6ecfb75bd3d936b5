//! Blocking Gerrit client.

use std::time::Duration;

use gatehouse_git::Oid;
use serde::Deserialize;

use super::{ClientError, ReviewRecord, ReviewServer};
use crate::config::GerritConfig;

const SYSTEM: &str = "gerrit";

/// Gerrit's JSON responses open with this anti-XSSI line; it must be
/// stripped before parsing.
const XSSI_PREFIX: &str = ")]}'";

/// Gerrit over its REST API.
pub struct GerritHttp {
    base: String,
    user: Option<String>,
    password: Option<String>,
    client: reqwest::blocking::Client,
}

impl GerritHttp {
    /// Build a client from the `[gerrit]` system configuration section.
    ///
    /// # Errors
    /// Returns [`ClientError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(cfg: &GerritConfig) -> Result<Self, ClientError> {
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
            password: cfg.password.clone(),
            client,
        })
    }

    fn request(
        &self,
        req: reqwest::blocking::RequestBuilder,
        context: &str,
    ) -> Result<String, ClientError> {
        let req = match &self.user {
            Some(user) => req.basic_auth(user, self.password.as_deref()),
            None => req,
        };
        let response = req.send().map_err(|source| ClientError::Http {
            system: SYSTEM,
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                system: SYSTEM,
                status: status.as_u16(),
                detail: context.to_owned(),
            });
        }
        response.text().map_err(|source| ClientError::Http {
            system: SYSTEM,
            source,
        })
    }
}

/// Subset of Gerrit's `ChangeInfo` the pipeline reads.
#[derive(Debug, Deserialize)]
struct ChangeInfo {
    #[serde(rename = "_number")]
    number: u64,
    change_id: String,
}

/// Strip the anti-XSSI prefix line Gerrit puts before every JSON body.
fn strip_xssi(body: &str) -> &str {
    body.strip_prefix(XSSI_PREFIX)
        .map_or(body, |rest| rest.trim_start_matches(['\r', '\n']))
}

fn parse_changes(body: &str) -> Result<Vec<ReviewRecord>, ClientError> {
    let changes: Vec<ChangeInfo> =
        serde_json::from_str(strip_xssi(body)).map_err(|e| ClientError::Payload {
            system: SYSTEM,
            detail: e.to_string(),
        })?;
    Ok(changes
        .into_iter()
        .map(|c| ReviewRecord {
            number: c.number,
            change_id: c.change_id,
        })
        .collect())
}

impl ReviewServer for GerritHttp {
    fn query_approved(
        &self,
        change_id: &str,
        commit: Oid,
    ) -> Result<Vec<ReviewRecord>, ClientError> {
        // Spaces in `q` act as AND; reqwest percent-encodes them.
        let query = format!("change:{change_id} commit:{commit} label:Code-Review=2 status:open");
        let url = format!("{}/a/changes/", self.base);
        let body = self.request(
            self.client.get(url).query(&[("q", query.as_str())]),
            "querying approved changes",
        )?;
        parse_changes(&body)
    }

    fn mark_merged(&self, change_id: &str, commit: Oid) -> Result<(), ClientError> {
        let url = format!(
            "{}/a/changes/{change_id}/revisions/{commit}/review",
            self.base
        );
        let payload = serde_json::json!({
            "message": format!("Merged by direct push as commit {commit}."),
        });
        self.request(
            self.client.post(url).json(&payload),
            "marking change merged",
        )?;
        Ok(())
    }

    fn abandon(&self, change_id: &str, reason: &str) -> Result<(), ClientError> {
        let url = format!("{}/a/changes/{change_id}/abandon", self.base);
        let payload = serde_json::json!({ "message": reason });
        self.request(self.client.post(url).json(&payload), "abandoning change")?;
        Ok(())
    }
}
