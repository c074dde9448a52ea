//! Lending Contract Calls - LedgerReader / LedgerWriter over alloy-rs
//!
//! Encodes calls with the `sol!` interfaces, sends reads as `eth_call`
//! through a rate limiter, and submits writes after gas estimation.
//! Contract addresses come from the contract digest.

use std::num::NonZeroU32;
use std::sync::Arc;

use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::{debug, info, instrument};

use crate::adapters::digest::ContractDigest;
use crate::adapters::metrics::MetricsRegistry;
use crate::domain::{FilAmount, Loan, TxIntent};
use crate::error::StakerError;
use crate::ports::ledger::{LedgerReader, LedgerWriter, PreparedTx, TxOutcome};

use super::bindings::{IPoolFactory, IStats, ISimpleInterestPool, IWFIL};
use super::provider::NodeProvider;

/// Gas estimate is padded by this percentage before sending.
const GAS_HEADROOM_PERCENT: u64 = 20;

/// Singleton contracts the ledger talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerAddresses {
    pub pool_factory: Address,
    pub wfil: Address,
    /// Not every deployment ships the stats contract.
    pub stats: Option<Address>,
}

impl LedgerAddresses {
    /// Resolve addresses from the digest.
    pub fn from_digest(digest: &ContractDigest) -> Result<Self, StakerError> {
        Ok(Self {
            pool_factory: digest.address_of("PoolFactory")?,
            wfil: digest.address_of("WFIL")?,
            stats: digest.address_of("Stats").ok(),
        })
    }
}

/// alloy-backed implementation of both ledger ports.
pub struct EvmLedger {
    provider: Arc<NodeProvider>,
    addresses: LedgerAddresses,
    limiter: DefaultDirectRateLimiter,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl EvmLedger {
    pub fn new(provider: Arc<NodeProvider>, addresses: LedgerAddresses, reads_per_second: u32) -> Self {
        let rate = NonZeroU32::new(reads_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            provider,
            addresses,
            limiter: RateLimiter::direct(Quota::per_second(rate)),
            metrics: None,
        }
    }

    /// Count reads and read errors in the given registry.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub const fn addresses(&self) -> &LedgerAddresses {
        &self.addresses
    }

    /// Throttled `eth_call` returning the decoded return struct.
    async fn read<C>(&self, contract: &'static str, to: Address, call: C) -> Result<C::Return, StakerError>
    where
        C: SolCall + Send + Sync,
    {
        self.limiter.until_ready().await;
        if let Some(m) = &self.metrics {
            m.contract_reads.with_label_values(&[contract, C::SIGNATURE]).inc();
        }

        let tx = TransactionRequest::default()
            .to(to)
            .input(Bytes::from(call.abi_encode()).into());

        let provider = self.provider.inner();
        let result = match provider.call(&tx).await {
            Ok(raw) => C::abi_decode_returns(&raw, true).map_err(|e| StakerError::read(contract, C::SIGNATURE, e)),
            Err(e) => Err(StakerError::read(contract, C::SIGNATURE, e)),
        };

        if result.is_err() {
            if let Some(m) = &self.metrics {
                m.contract_read_errors.with_label_values(&[contract, C::SIGNATURE]).inc();
            }
        }
        result
    }

    /// Calldata, target and value for an intent.
    fn request_for(&self, intent: &TxIntent) -> Result<TransactionRequest, StakerError> {
        let from = self.provider.signer_address().ok_or(StakerError::NotConnected)?;

        let (to, input, value) = match intent {
            TxIntent::WrapFil { amount } => (
                self.addresses.wfil,
                IWFIL::depositCall {}.abi_encode(),
                amount.to_atto(),
            ),
            TxIntent::ApproveWfil { spender, amount } => (
                self.addresses.wfil,
                IWFIL::approveCall {
                    spender: *spender,
                    amount: amount.to_atto(),
                }
                .abi_encode(),
                U256::ZERO,
            ),
            TxIntent::DepositPool { pool, amount, receiver } => (
                *pool,
                ISimpleInterestPool::depositCall {
                    assets: amount.to_atto(),
                    receiver: *receiver,
                }
                .abi_encode(),
                U256::ZERO,
            ),
            TxIntent::WithdrawPool { pool, amount, receiver, owner } => (
                *pool,
                ISimpleInterestPool::withdrawCall {
                    assets: amount.to_atto(),
                    receiver: *receiver,
                    owner: *owner,
                }
                .abi_encode(),
                U256::ZERO,
            ),
            TxIntent::Borrow { pool, amount, loan_agent } => (
                *pool,
                ISimpleInterestPool::borrowCall {
                    amount: amount.to_atto(),
                    loanAgent: *loan_agent,
                }
                .abi_encode(),
                U256::ZERO,
            ),
            TxIntent::Repay { pool, amount, loan_agent, payee } => (
                *pool,
                ISimpleInterestPool::repayCall {
                    amount: amount.to_atto(),
                    loanAgent: *loan_agent,
                    payee: *payee,
                }
                .abi_encode(),
                U256::ZERO,
            ),
        };

        Ok(TransactionRequest::default()
            .from(from)
            .to(to)
            .value(value)
            .input(Bytes::from(input).into()))
    }
}

#[async_trait]
impl LedgerReader for EvmLedger {
    #[instrument(skip(self))]
    async fn pool_count(&self) -> Result<u64, StakerError> {
        let ret = self
            .read("PoolFactory", self.addresses.pool_factory, IPoolFactory::allPoolsLengthCall {})
            .await?;
        Ok(ret._0.saturating_to::<u64>())
    }

    #[instrument(skip(self))]
    async fn pool_address(&self, index: u64) -> Result<Address, StakerError> {
        let ret = self
            .read(
                "PoolFactory",
                self.addresses.pool_factory,
                IPoolFactory::allPoolsCall { index: U256::from(index) },
            )
            .await?;
        Ok(ret._0)
    }

    async fn pool_name(&self, pool: Address) -> Result<String, StakerError> {
        let ret = self.read("SimpleInterestPool", pool, ISimpleInterestPool::nameCall {}).await?;
        Ok(ret._0)
    }

    async fn preview_deposit(&self, pool: Address, assets: FilAmount) -> Result<FilAmount, StakerError> {
        let ret = self
            .read(
                "SimpleInterestPool",
                pool,
                ISimpleInterestPool::previewDepositCall { assets: assets.to_atto() },
            )
            .await?;
        Ok(FilAmount::from_atto(ret._0))
    }

    async fn convert_to_assets(&self, pool: Address, shares: FilAmount) -> Result<FilAmount, StakerError> {
        let ret = self
            .read(
                "SimpleInterestPool",
                pool,
                ISimpleInterestPool::convertToAssetsCall { shares: shares.to_atto() },
            )
            .await?;
        Ok(FilAmount::from_atto(ret._0))
    }

    async fn interest_rate(&self, pool: Address) -> Result<FilAmount, StakerError> {
        let ret = self
            .read("SimpleInterestPool", pool, ISimpleInterestPool::interestRateCall {})
            .await?;
        Ok(FilAmount::from_atto(ret._0))
    }

    async fn total_assets(&self, pool: Address) -> Result<FilAmount, StakerError> {
        let ret = self
            .read("SimpleInterestPool", pool, ISimpleInterestPool::totalAssetsCall {})
            .await?;
        Ok(FilAmount::from_atto(ret._0))
    }

    #[instrument(skip(self))]
    async fn pool_token_balance(&self, pool: Address, owner: Address) -> Result<FilAmount, StakerError> {
        let ret = self
            .read("SimpleInterestPool", pool, ISimpleInterestPool::balanceOfCall { owner })
            .await?;
        Ok(FilAmount::from_atto(ret._0))
    }

    #[instrument(skip(self))]
    async fn loan(&self, pool: Address, borrower: Address) -> Result<Loan, StakerError> {
        let ret = self
            .read("SimpleInterestPool", pool, ISimpleInterestPool::getLoanCall { borrower })
            .await?;
        let raw = ret.loan;
        Ok(Loan {
            start_epoch: raw.startEpoch,
            periods: raw.periods,
            principal: FilAmount::from_atto(raw.principal),
            interest: FilAmount::from_atto(raw.interest),
            total_paid: FilAmount::from_atto(raw.totalPaid),
        })
    }

    #[instrument(skip(self))]
    async fn loan_balance(&self, pool: Address, borrower: Address) -> Result<FilAmount, StakerError> {
        let ret = self
            .read("SimpleInterestPool", pool, ISimpleInterestPool::loanBalanceCall { borrower })
            .await?;
        Ok(FilAmount::from_atto(ret._0))
    }

    async fn has_penalties(&self, agent: Address) -> Result<Option<bool>, StakerError> {
        let Some(stats) = self.addresses.stats else {
            return Ok(None);
        };
        let ret = self.read("Stats", stats, IStats::hasPenaltiesCall { agent }).await?;
        Ok(Some(ret._0))
    }

    #[instrument(skip(self))]
    async fn wfil_balance(&self, owner: Address) -> Result<FilAmount, StakerError> {
        let ret = self
            .read("WFIL", self.addresses.wfil, IWFIL::balanceOfCall { owner })
            .await?;
        Ok(FilAmount::from_atto(ret._0))
    }

    #[instrument(skip(self))]
    async fn wfil_allowance(&self, owner: Address, spender: Address) -> Result<FilAmount, StakerError> {
        let ret = self
            .read("WFIL", self.addresses.wfil, IWFIL::allowanceCall { owner, spender })
            .await?;
        Ok(FilAmount::from_atto(ret._0))
    }
}

#[async_trait]
impl LedgerWriter for EvmLedger {
    #[instrument(skip(self), fields(action = intent.label()))]
    async fn prepare(&self, intent: &TxIntent) -> Result<PreparedTx, StakerError> {
        let action = intent.label();
        let tx = self.request_for(intent)?;

        let estimate = self
            .provider
            .inner()
            .estimate_gas(&tx)
            .await
            .map_err(|e| StakerError::Preparation { action, source: e.into() })?;

        let gas_limit = estimate + estimate * GAS_HEADROOM_PERCENT / 100;
        debug!(estimate, gas_limit, "Gas estimated");

        Ok(PreparedTx {
            intent: intent.clone(),
            gas_limit,
        })
    }

    #[instrument(skip(self, prepared), fields(action = prepared.intent.label()))]
    async fn submit(&self, prepared: PreparedTx) -> Result<TxOutcome, StakerError> {
        let action = prepared.intent.label();
        let tx = self.request_for(&prepared.intent)?.gas_limit(prepared.gas_limit);

        let pending = self
            .provider
            .inner()
            .send_transaction(tx)
            .await
            .map_err(|e| StakerError::Submission { action, source: e.into() })?;

        info!(tx_hash = %pending.tx_hash(), "Transaction sent, awaiting receipt");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| StakerError::Submission { action, source: e.into() })?;

        Ok(TxOutcome {
            tx_hash: receipt.transaction_hash(),
            success: receipt.status(),
            block_number: receipt.block_number(),
        })
    }
}
