//! Health Check Server - Liveness, Readiness and Metrics
//!
//! Exposes /live, /ready and /metrics via axum 0.7 while `watch` runs.
//! Readiness requires the node to answer and the latest poll to have
//! succeeded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use super::prometheus::MetricsRegistry;

/// Shared health state updated by the watch loop.
#[derive(Debug)]
pub struct HealthState {
    /// Whether the RPC node answered its last health call.
    pub node_healthy: AtomicBool,
    /// Whether the most recent poll completed without error.
    pub last_poll_ok: AtomicBool,
}

impl HealthState {
    /// Starts not ready until the first poll lands.
    pub fn new() -> Self {
        Self {
            node_healthy: AtomicBool::new(false),
            last_poll_ok: AtomicBool::new(false),
        }
    }

    pub fn set_node_healthy(&self, healthy: bool) {
        self.node_healthy.store(healthy, Ordering::Relaxed);
    }

    pub fn set_last_poll_ok(&self, ok: bool) {
        self.last_poll_ok.store(ok, Ordering::Relaxed);
    }

    pub fn is_ready(&self) -> bool {
        self.node_healthy.load(Ordering::Relaxed) && self.last_poll_ok.load(Ordering::Relaxed)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
struct AppState {
    health: Arc<HealthState>,
    metrics: Arc<MetricsRegistry>,
}

/// Axum-based health and metrics HTTP server.
pub struct HealthServer {
    health: Arc<HealthState>,
    metrics: Arc<MetricsRegistry>,
    bind_address: String,
}

impl HealthServer {
    pub fn new(health: Arc<HealthState>, metrics: Arc<MetricsRegistry>, bind_address: impl Into<String>) -> Self {
        Self {
            health,
            metrics,
            bind_address: bind_address.into(),
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .route("/metrics", get(Self::metrics))
            .with_state(AppState {
                health: Arc::clone(&self.health),
                metrics: Arc::clone(&self.metrics),
            })
    }

    /// Serve until `shutdown_rx` fires.
    #[instrument(skip(self, shutdown_rx), fields(address = %self.bind_address))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;

        info!("Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
        if state.health.is_ready() {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }

    async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
        match state.metrics.render() {
            Ok(body) => (StatusCode::OK, body),
            Err(e) => {
                warn!(error = %e, "Failed to encode metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_needs_node_and_poll() {
        let state = HealthState::new();
        assert!(!state.is_ready());
        state.set_node_healthy(true);
        assert!(!state.is_ready());
        state.set_last_poll_ok(true);
        assert!(state.is_ready());
        state.set_node_healthy(false);
        assert!(!state.is_ready());
    }

    #[tokio::test]
    async fn test_server_answers_probes_and_shuts_down() {
        let health = Arc::new(HealthState::new());
        let metrics = Arc::new(MetricsRegistry::new().unwrap());

        // Bind to an ephemeral port first so the test knows where to connect.
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = probe.local_addr().unwrap();
        drop(probe);

        let server = HealthServer::new(Arc::clone(&health), metrics, addr.to_string());
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(server.run(rx));

        let client = reqwest::Client::new();
        let mut live = None;
        for _ in 0..50 {
            if let Ok(resp) = client.get(format!("http://{addr}/live")).send().await {
                live = Some(resp.status());
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(live, Some(reqwest::StatusCode::OK));

        let ready = client.get(format!("http://{addr}/ready")).send().await.unwrap();
        assert_eq!(ready.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

        health.set_node_healthy(true);
        health.set_last_poll_ok(true);
        let ready = client.get(format!("http://{addr}/ready")).send().await.unwrap();
        assert_eq!(ready.status(), reqwest::StatusCode::OK);

        let metrics_body = client.get(format!("http://{addr}/metrics")).send().await.unwrap().text().await.unwrap();
        assert!(metrics_body.contains("staker_node_reachable"));

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
