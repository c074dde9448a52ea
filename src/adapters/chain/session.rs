//! Wallet session backed by the node provider.

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::Provider;
use async_trait::async_trait;

use crate::domain::FilAmount;
use crate::error::StakerError;
use crate::ports::session::WalletSession;

use super::provider::NodeProvider;

/// Account in use for this run.
///
/// Signing sessions use the signer's address; read-only sessions use the
/// configured `wallet.address`, and no address means disconnected.
pub struct ChainSession {
    provider: Arc<NodeProvider>,
    address: Option<Address>,
}

impl ChainSession {
    pub fn new(provider: Arc<NodeProvider>, watch_address: Option<Address>) -> Self {
        let address = provider.signer_address().or(watch_address);
        Self { provider, address }
    }
}

#[async_trait]
impl WalletSession for ChainSession {
    fn address(&self) -> Option<Address> {
        self.address
    }

    fn can_sign(&self) -> bool {
        self.provider.signer_address().is_some()
    }

    async fn balance(&self) -> Result<FilAmount, StakerError> {
        let owner = self.address.ok_or(StakerError::NotConnected)?;
        let atto = self
            .provider
            .inner()
            .get_balance(owner)
            .await
            .map_err(|e| StakerError::read("Account", "eth_getBalance", e))?;
        Ok(FilAmount::from_atto(atto))
    }
}
