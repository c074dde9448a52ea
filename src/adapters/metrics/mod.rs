//! Metrics and Monitoring Adapters
//!
//! Prometheus counters plus the /live, /ready and /metrics endpoints
//! served by axum 0.7 during `watch`.

pub mod health;
pub mod prometheus;

pub use health::{HealthServer, HealthState};
pub use prometheus::MetricsRegistry;
