//! Node Status Probe - Optional HTTP Health Service
//!
//! Some deployments run a status service next to the node. When its URL
//! is configured, `landing` and `watch` report whether it answers and
//! pass through its JSON body.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Outcome of one probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStatus {
    /// The service answered with a 2xx status.
    pub reachable: bool,
    /// HTTP status code, when a response arrived.
    pub http_status: Option<u16>,
    /// Response body when it parsed as JSON.
    pub detail: Option<serde_json::Value>,
}

impl NodeStatus {
    const fn unreachable() -> Self {
        Self {
            reachable: false,
            http_status: None,
            detail: None,
        }
    }
}

/// HTTP client for the node-status service.
pub struct NodeStatusClient {
    http: Client,
    url: String,
}

impl NodeStatusClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, url: url.into() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Probe the service. Transport errors yield an unreachable status.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn probe(&self) -> NodeStatus {
        let response = match self.http.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Node status service unreachable");
                return NodeStatus::unreachable();
            }
        };

        let status = response.status();
        let detail = response.json::<serde_json::Value>().await.ok();
        debug!(status = status.as_u16(), "Node status probed");

        NodeStatus {
            reachable: status.is_success(),
            http_status: Some(status.as_u16()),
            detail,
        }
    }
}
