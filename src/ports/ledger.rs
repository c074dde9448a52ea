//! Ledger Ports - Contract Read and Write Interfaces
//!
//! The lending contracts are an external system reached only through
//! `view` calls and transactions. These traits are the whole surface the
//! use cases depend on; the alloy adapter implements both.

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{FilAmount, Loan, TxIntent};
use crate::error::StakerError;

/// Read-only contract calls.
#[async_trait]
pub trait LedgerReader: Send + Sync + 'static {
    /// `PoolFactory.allPoolsLength()`.
    async fn pool_count(&self) -> Result<u64, StakerError>;

    /// `PoolFactory.allPools(index)`.
    async fn pool_address(&self, index: u64) -> Result<Address, StakerError>;

    /// `pool.name()`.
    async fn pool_name(&self, pool: Address) -> Result<String, StakerError>;

    /// `pool.previewDeposit(assets)`: shares minted for `assets`.
    async fn preview_deposit(&self, pool: Address, assets: FilAmount) -> Result<FilAmount, StakerError>;

    /// `pool.convertToAssets(shares)`.
    async fn convert_to_assets(&self, pool: Address, shares: FilAmount) -> Result<FilAmount, StakerError>;

    /// `pool.interestRate()`.
    async fn interest_rate(&self, pool: Address) -> Result<FilAmount, StakerError>;

    /// `pool.totalAssets()`.
    async fn total_assets(&self, pool: Address) -> Result<FilAmount, StakerError>;

    /// `pool.balanceOf(owner)`: pool share balance.
    async fn pool_token_balance(&self, pool: Address, owner: Address) -> Result<FilAmount, StakerError>;

    /// `pool.getLoan(borrower)`.
    async fn loan(&self, pool: Address, borrower: Address) -> Result<Loan, StakerError>;

    /// `pool.loanBalance(borrower)`.
    async fn loan_balance(&self, pool: Address, borrower: Address) -> Result<FilAmount, StakerError>;

    /// `Stats.hasPenalties(agent)`; `None` when no stats contract is deployed.
    async fn has_penalties(&self, agent: Address) -> Result<Option<bool>, StakerError>;

    /// `WFIL.balanceOf(owner)`.
    async fn wfil_balance(&self, owner: Address) -> Result<FilAmount, StakerError>;

    /// `WFIL.allowance(owner, spender)`.
    async fn wfil_allowance(&self, owner: Address, spender: Address) -> Result<FilAmount, StakerError>;
}

/// A transaction that passed gas estimation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTx {
    pub intent: TxIntent,
    pub gas_limit: u64,
}

/// Mined transaction summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxOutcome {
    pub tx_hash: B256,
    /// Receipt status: false means the transaction reverted.
    pub success: bool,
    pub block_number: Option<u64>,
}

/// Mutating contract calls.
///
/// Submission is split in two so callers can refuse to send anything when
/// preparation fails.
#[async_trait]
pub trait LedgerWriter: Send + Sync + 'static {
    /// Build and simulate the transaction (gas estimation).
    async fn prepare(&self, intent: &TxIntent) -> Result<PreparedTx, StakerError>;

    /// Sign, send, and wait for the receipt.
    async fn submit(&self, prepared: PreparedTx) -> Result<TxOutcome, StakerError>;
}
