//! Codeforces `contest.list` client

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::contest::{select_next_upcoming, Contest};
use crate::error::DirectoryError;

/// Read-only source of contests
#[async_trait]
pub trait ContestDirectory: Send + Sync {
    /// Full contest list, gym contests excluded.
    async fn fetch_contests(&self) -> Result<Vec<Contest>, DirectoryError>;

    /// Earliest contest that has not started yet.
    ///
    /// Any failure is logged and reported as `None`; callers treat that as
    /// "nothing to do this cycle".
    async fn fetch_next_upcoming_contest(&self) -> Option<Contest> {
        match self.fetch_contests().await {
            Ok(contests) => {
                let next = select_next_upcoming(&contests);
                match &next {
                    Some(contest) => debug!(
                        "Next upcoming contest: {} ({}) at {:?}",
                        contest.id, contest.name, contest.start_time_seconds
                    ),
                    None => debug!("No upcoming contest among {} listed", contests.len()),
                }
                next
            }
            Err(e) => {
                warn!("Failed to fetch contest list: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    result: Option<Vec<Contest>>,
}

/// HTTP client for the Codeforces API
#[derive(Debug, Clone)]
pub struct CodeforcesClient {
    http: reqwest::Client,
    base_url: String,
}

impl CodeforcesClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cf-reminder/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn contest_list_url(&self) -> String {
        format!("{}/api/contest.list", self.base_url)
    }
}

#[async_trait]
impl ContestDirectory for CodeforcesClient {
    async fn fetch_contests(&self) -> Result<Vec<Contest>, DirectoryError> {
        let url = self.contest_list_url();
        debug!("Fetching contest list from {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("gym", "false")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status(status));
        }

        let body = response.text().await?;
        let envelope: Envelope = serde_json::from_str(&body)?;

        if envelope.status != "OK" {
            return Err(DirectoryError::Rejected {
                comment: envelope
                    .comment
                    .unwrap_or_else(|| format!("status {}", envelope.status)),
            });
        }

        envelope.result.ok_or_else(|| DirectoryError::Rejected {
            comment: "response has no result".to_string(),
        })
    }
}
