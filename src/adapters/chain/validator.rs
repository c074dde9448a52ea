//! Contract Validator - Digest Verification at Startup
//!
//! Checks that the digest's singleton contracts have deployed code on the
//! connected node. A digest generated against another devnet is the usual
//! cause of every read failing, so this runs before the first poll.

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::Provider;
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use super::ledger::LedgerAddresses;

/// Result of validating a single contract.
#[derive(Debug)]
pub struct ValidationResult {
    pub name: &'static str,
    pub address: Address,
    pub has_code: bool,
}

pub struct ContractValidator {
    provider: Arc<dyn Provider + Send + Sync>,
}

impl ContractValidator {
    pub fn new(provider: Arc<dyn Provider + Send + Sync>) -> Self {
        Self { provider }
    }

    /// Validate every address in `addresses`.
    ///
    /// Fails when the pool factory has no code; other contracts only warn.
    #[instrument(skip_all)]
    pub async fn validate_all(&self, addresses: &LedgerAddresses) -> Result<Vec<ValidationResult>> {
        let mut contracts = vec![("PoolFactory", addresses.pool_factory), ("WFIL", addresses.wfil)];
        if let Some(stats) = addresses.stats {
            contracts.push(("Stats", stats));
        }

        let mut results = Vec::with_capacity(contracts.len());
        for (name, address) in contracts {
            let result = self.validate_contract(name, address).await?;
            if result.has_code {
                info!(contract = name, %address, "Contract has code");
            } else {
                warn!(contract = name, %address, "Contract has no code, digest may be stale");
            }
            results.push(result);
        }

        if let Some(factory) = results.first() {
            anyhow::ensure!(
                factory.has_code,
                "PoolFactory at {} has no deployed code, regenerate the contract digest",
                factory.address
            );
        }

        Ok(results)
    }

    async fn validate_contract(&self, name: &'static str, address: Address) -> Result<ValidationResult> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .with_context(|| format!("Failed to query code for {name}"))?;

        Ok(ValidationResult {
            name,
            address,
            has_code: !code.is_empty(),
        })
    }
}
