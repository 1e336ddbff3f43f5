use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum FarmError {
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("scheduler rejected credentials for {url} ({status})")]
    Unauthorized { url: String, status: StatusCode },
    #[error("scheduler returned {status} for {url}")]
    Status { url: String, status: StatusCode },
    #[error("failed to decode response from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },
}

/// Inventory entry as the scheduler reports it. Counts default to zero so a
/// scheduler that omits a state bucket cannot poison the snapshot; any total
/// the scheduler reports alongside is ignored and recomputed by the builder.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDeviceType {
    pub name: String,
    #[serde(default)]
    pub busy: u64,
    #[serde(default)]
    pub idle: u64,
    #[serde(default)]
    pub offline: u64,
}

pub struct FarmClient {
    http: Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl FarmClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http,
            base_url,
            token: token.into(),
            timeout,
        }
    }

    /// One round trip for the full device-type inventory. Any failure here is
    /// fatal for the run: without inventory there is no snapshot to take.
    pub async fn fetch_inventory(&self) -> Result<Vec<RawDeviceType>, FarmError> {
        let url = format!("{}/scheduler/device-types", self.base_url);
        let resp = self.get(&url).await?;
        resp.json().await.map_err(|source| FarmError::Decode { url, source })
    }

    /// Pending-job counts keyed by device type. Failure is non-fatal: the
    /// caller degrades every queue depth to zero instead of aborting the run,
    /// since a report without queue data still beats no report.
    pub async fn fetch_queue_depths(&self) -> Option<HashMap<String, u64>> {
        let url = format!("{}/scheduler/queue", self.base_url);
        let resp = match self.get(&url).await {
            Ok(resp) => resp,
            Err(err) => {
                warn!(error = %err, "queue depths unavailable, reporting zero queues");
                return None;
            }
        };
        match resp.json().await {
            Ok(depths) => Some(depths),
            Err(err) => {
                warn!(url = %url, error = %err, "queue depths undecodable, reporting zero queues");
                None
            }
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FarmError> {
        let resp = self
            .http
            .get(url)
            .header("Authorization", format!("Token {}", self.token))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| FarmError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FarmError::Unauthorized {
                url: url.to_string(),
                status,
            });
        }
        if !status.is_success() {
            return Err(FarmError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(resp)
    }
}
