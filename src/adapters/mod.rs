//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (node RPC, files, HTTP). Each sub-module groups
//! adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: lending contracts and wallet session via alloy-rs
//! - `digest`: deployed contract digest loading and generation
//! - `metrics`: Prometheus metrics export and health checks
//! - `status`: optional node-status HTTP probe

pub mod chain;
pub mod digest;
pub mod metrics;
pub mod status;
