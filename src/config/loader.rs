//! Configuration Loader - File Loading, Env Overrides and Validation

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Env var overriding `network.rpc_url`.
pub const RPC_URL_ENV: &str = "STAKER_RPC_URL";
/// Env var overriding `network.node_status_url`.
pub const NODE_STATUS_URL_ENV: &str = "STAKER_NODE_STATUS_URL";
/// Env var overriding `contracts.digest_path`.
pub const DIGEST_PATH_ENV: &str = "STAKER_DIGEST_PATH";

/// Load, apply env overrides, and validate configuration.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
    let path = Path::new(path);

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content, |key| std::env::var(key).ok())?;

    info!(
        rpc = %config.network.rpc_url,
        digest = %config.contracts.digest_path,
        refresh_ms = config.polling.refresh_interval_ms,
        "Configuration loaded successfully"
    );

    Ok(config)
}

/// Parse TOML text and apply overrides from `env`.
///
/// `env` is injected so tests do not touch the process environment.
pub fn parse_config<F>(content: &str, env: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: AppConfig = toml::from_str(content).context("Failed to parse config.toml")?;

    if let Some(url) = env(RPC_URL_ENV) {
        config.network.rpc_url = url;
    }
    if let Some(url) = env(NODE_STATUS_URL_ENV) {
        config.network.node_status_url = Some(url);
    }
    if let Some(path) = env(DIGEST_PATH_ENV) {
        config.contracts.digest_path = path;
    }

    validate_config(&config)?;
    Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
    anyhow::ensure!(
        !config.network.rpc_url.trim().is_empty(),
        "network.rpc_url must not be empty"
    );
    anyhow::ensure!(
        config.network.reads_per_second > 0,
        "network.reads_per_second must be positive"
    );
    anyhow::ensure!(
        config.polling.refresh_interval_ms > 0,
        "polling.refresh_interval_ms must be positive"
    );
    anyhow::ensure!(
        !config.contracts.digest_path.trim().is_empty(),
        "contracts.digest_path must not be empty"
    );

    if let Some(addr) = &config.wallet.address {
        addr.parse::<alloy::primitives::Address>()
            .with_context(|| format!("wallet.address is not an address: {addr}"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[network]
rpc_url = "http://127.0.0.1:1234/rpc/v1"
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse_config(MINIMAL, no_env).unwrap();
        assert_eq!(config.polling.refresh_interval_ms, 10_000);
        assert_eq!(config.contracts.digest_path, "generated/contractDigest.json");
        assert_eq!(config.network.reads_per_second, 20);
        assert!(config.network.node_status_url.is_none());
        assert_eq!(config.app.log_level, "info");
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let config = parse_config(MINIMAL, |key| match key {
            RPC_URL_ENV => Some("http://node:1234".into()),
            NODE_STATUS_URL_ENV => Some("http://status".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.network.rpc_url, "http://node:1234");
        assert_eq!(config.network.node_status_url.as_deref(), Some("http://status"));
    }

    #[test]
    fn test_rejects_zero_refresh_interval() {
        let toml = format!("{MINIMAL}\n[polling]\nrefresh_interval_ms = 0\n");
        assert!(parse_config(&toml, no_env).is_err());
    }

    #[test]
    fn test_rejects_bad_wallet_address() {
        let toml = format!("{MINIMAL}\n[wallet]\naddress = \"not-an-address\"\n");
        assert!(parse_config(&toml, no_env).is_err());
    }

    #[test]
    fn test_rejects_empty_rpc() {
        let toml = "[network]\nrpc_url = \"\"\n";
        assert!(parse_config(toml, no_env).is_err());
    }
}
