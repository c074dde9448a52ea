//! Wallet Session Port - the connected account.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::domain::FilAmount;
use crate::error::StakerError;

/// Connected account, if any, and its native balance.
#[async_trait]
pub trait WalletSession: Send + Sync + 'static {
    /// Account address scoping all per-user reads. `None` when disconnected.
    fn address(&self) -> Option<Address>;

    /// Whether this session can sign transactions.
    fn can_sign(&self) -> bool;

    /// Native FIL balance of the account.
    async fn balance(&self) -> Result<FilAmount, StakerError>;
}
