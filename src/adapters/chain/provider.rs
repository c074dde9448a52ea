//! Node RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Connects to the node's JSON-RPC endpoint, optionally with a local
//! signing wallet, checks the chain id, and exposes a shared provider
//! instance for all contract calls.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::config::NetworkConfig;

/// Shared RPC provider backed by alloy-rs 0.9.
///
/// Uses `dyn Provider` so the signing and read-only variants have the same
/// type; the builder's filler stack is not part of the adapter API.
pub struct NodeProvider {
    provider: Arc<dyn Provider + Send + Sync>,
    /// Address of the local signer, when one was supplied.
    signer: Option<Address>,
    chain_id: u64,
}

impl NodeProvider {
    /// Connect and validate the chain id against `network.chain_id`.
    #[instrument(skip_all, fields(rpc = %config.rpc_url))]
    pub async fn connect(config: &NetworkConfig, signer: Option<PrivateKeySigner>) -> Result<Self> {
        let signer_address = signer.as_ref().map(PrivateKeySigner::address);

        let provider: Arc<dyn Provider + Send + Sync> = match signer {
            Some(signer) => Arc::new(
                ProviderBuilder::new()
                    .with_recommended_fillers()
                    .wallet(EthereumWallet::from(signer))
                    .on_builtin(&config.rpc_url)
                    .await
                    .context("Failed to connect to RPC node")?,
            ),
            None => Arc::new(
                ProviderBuilder::new()
                    .on_builtin(&config.rpc_url)
                    .await
                    .context("Failed to connect to RPC node")?,
            ),
        };

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if let Some(expected) = config.chain_id {
            anyhow::ensure!(
                chain_id == expected,
                "Expected chain_id={expected}, node reports {chain_id}"
            );
        }

        info!(chain_id, signer = ?signer_address, "Connected to RPC node");

        Ok(Self {
            provider,
            signer: signer_address,
            chain_id,
        })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    /// Address transactions are sent from, if a signer is configured.
    pub const fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}

/// Read the signing key from the environment, if present.
pub fn signer_from_env() -> Result<Option<PrivateKeySigner>> {
    match std::env::var(crate::config::PRIVATE_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => {
            let signer: PrivateKeySigner = key
                .trim()
                .parse()
                .context("STAKER_PRIVATE_KEY is not a valid private key")?;
            Ok(Some(signer))
        }
        _ => Ok(None),
    }
}
