//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides for endpoints and the digest path.
//! The signing key is only ever read from the environment.

pub mod loader;

use serde::Deserialize;

/// Env var holding the hex private key used to sign transactions.
pub const PRIVATE_KEY_ENV: &str = "STAKER_PRIVATE_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Identity and logging.
    #[serde(default)]
    pub app: AppSection,
    /// Node endpoints.
    pub network: NetworkConfig,
    /// Deployed contract digest.
    #[serde(default)]
    pub contracts: ContractsConfig,
    /// Revalidation cadence.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Read-only account when no signer is configured.
    #[serde(default)]
    pub wallet: WalletConfig,
    /// Metrics and health endpoints for `watch`.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Identity and logging.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// Human-readable name used in logs.
    #[serde(default = "default_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// Node endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint of the node.
    pub rpc_url: String,
    /// Expected chain id; checked at connect time when set.
    pub chain_id: Option<u64>,
    /// Optional node-status service probed by `landing` and `watch`.
    pub node_status_url: Option<String>,
    /// Upper bound on contract reads per second.
    #[serde(default = "default_reads_per_second")]
    pub reads_per_second: u32,
    /// Request timeout in seconds for the status service.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Contract digest location.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    /// JSON file mapping contract names to addresses and ABIs.
    #[serde(default = "default_digest_path")]
    pub digest_path: String,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            digest_path: default_digest_path(),
        }
    }
}

/// Revalidation cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Interval between automatic refreshes (milliseconds).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval(),
        }
    }
}

/// Read-only wallet configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    /// Account to inspect when no private key is provided.
    pub address: Option<String>,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Serve /live, /ready and /metrics while watching.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Bind address for the health/metrics server.
    #[serde(default = "default_metrics_addr")]
    pub bind_address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_metrics_addr(),
        }
    }
}

// Default value functions for serde

fn default_name() -> String {
    "staker".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_reads_per_second() -> u32 {
    20
}

fn default_timeout() -> u64 {
    10
}

fn default_digest_path() -> String {
    "generated/contractDigest.json".to_string()
}

fn default_refresh_interval() -> u64 {
    10_000
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}
