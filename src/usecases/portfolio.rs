//! Read-only views: landing summary, portfolio and the pool page.
//!
//! Aggregation here is limited to sums over contract reads; share to
//! asset conversion is always delegated to the pool contract.

use std::sync::Arc;

use alloy::primitives::Address;
use futures_util::future::try_join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{instrument, warn};

use crate::domain::format::{format_pnl, friendly_balance, friendly_decimal, percent, FRIENDLY_DECIMALS};
use crate::domain::{
    deposit_eligibility, transact_view, DepositEligibility, FilAmount, Pool, PoolFormContext, TransactTab,
    TransactView,
};
use crate::error::StakerError;
use crate::ports::ledger::LedgerReader;
use crate::ports::session::WalletSession;

use super::balances::BalanceService;
use super::pools::PoolDirectory;

/// One row of "Your Holdings".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldingRow {
    pub pool_id: String,
    pub pool_name: String,
    pub token_symbol: String,
    /// FIL per pool token.
    pub token_price: Decimal,
    pub token_balance: FilAmount,
    /// Token balance converted to FIL by the pool.
    pub value: FilAmount,
    /// No cost basis is tracked, so this is always zero.
    pub pnl: Decimal,
}

impl HoldingRow {
    pub const COLUMNS: [&'static str; 5] = ["Pool Name", "Token Price", "Token Balance", "Value", "P/L"];

    pub fn cells(&self) -> [String; 5] {
        [
            self.pool_name.clone(),
            format!("{} FIL", friendly_decimal(self.token_price, FRIENDLY_DECIMALS, true)),
            format!(
                "{} {}",
                friendly_balance(&self.token_balance, FRIENDLY_DECIMALS, true),
                self.token_symbol
            ),
            format!("{} FIL", friendly_balance(&self.value, FRIENDLY_DECIMALS, true)),
            format_pnl(self.pnl),
        ]
    }
}

/// A pool the account does not hold yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opportunity {
    pub pool_id: String,
    pub name: String,
    pub interest_rate: FilAmount,
    pub token_price: Decimal,
}

impl Opportunity {
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Current APY", percent(&self.interest_rate)),
            (
                "Current token price",
                format!("{} FIL", friendly_decimal(self.token_price, FRIENDLY_DECIMALS, false)),
            ),
        ]
    }
}

/// Portfolio page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Portfolio {
    /// Native plus wrapped FIL in the wallet.
    pub liquid_fil: FilAmount,
    pub total_deposited: FilAmount,
    pub total_pnl: Decimal,
    pub holdings: Vec<HoldingRow>,
    pub opportunities: Vec<Opportunity>,
}

impl Portfolio {
    pub fn stat_lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Liquid FIL", format!("{} FIL", friendly_balance(&self.liquid_fil, FRIENDLY_DECIMALS, true))),
            (
                "Total deposited",
                format!("{} FIL", friendly_balance(&self.total_deposited, FRIENDLY_DECIMALS, true)),
            ),
            ("Total profit/loss", format_pnl(self.total_pnl)),
        ]
    }
}

/// Landing page summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Landing {
    pub pool_count: usize,
    pub total_assets: FilAmount,
    /// Highest interest rate across pools.
    pub best_rate: Option<FilAmount>,
    pub account: Option<Address>,
}

impl Landing {
    pub fn stat_lines(&self) -> Vec<(&'static str, String)> {
        let account = self
            .account
            .map_or_else(|| "Not connected".to_string(), |a| crate::domain::format::truncate_address(&a));
        vec![
            ("Pools", self.pool_count.to_string()),
            (
                "Total assets",
                format!("{} FIL", friendly_balance(&self.total_assets, FRIENDLY_DECIMALS, true)),
            ),
            ("Best APY", self.best_rate.as_ref().map_or_else(|| "-".to_string(), percent)),
            ("Account", account),
        ]
    }
}

/// Pool page: stats, the account's holdings and the transact panel.
#[derive(Debug, Clone, Serialize)]
pub struct PoolPage {
    pub pool: Pool,
    /// Pool tokens held by the account.
    pub holdings: FilAmount,
    pub eligibility: DepositEligibility,
    pub tab: TransactTab,
    pub view: TransactView,
    #[serde(skip)]
    pub context: PoolFormContext,
}

impl PoolPage {
    pub fn holding_lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Your holdings", friendly_balance(&self.holdings, FRIENDLY_DECIMALS, true)),
            ("Your earnings", format!("0 {}", self.pool.token_symbol())),
        ]
    }
}

/// FIL per pool token, the inverse of shares per FIL.
pub fn token_price(exchange_rate: Decimal) -> Decimal {
    Decimal::ONE.checked_div(exchange_rate).unwrap_or(Decimal::ZERO)
}

pub struct PortfolioService<R: LedgerReader, S: WalletSession> {
    ledger: Arc<R>,
    pools: PoolDirectory<R>,
    balances: BalanceService<R, S>,
}

impl<R: LedgerReader, S: WalletSession> PortfolioService<R, S> {
    pub fn new(ledger: Arc<R>, session: Arc<S>) -> Self {
        Self {
            pools: PoolDirectory::new(Arc::clone(&ledger)),
            balances: BalanceService::new(Arc::clone(&ledger), session),
            ledger,
        }
    }

    pub const fn pools(&self) -> &PoolDirectory<R> {
        &self.pools
    }

    pub const fn balances(&self) -> &BalanceService<R, S> {
        &self.balances
    }

    #[instrument(skip(self))]
    pub async fn landing(&self) -> Result<Landing, StakerError> {
        let pools = self.pools.list().await?;
        Ok(Landing {
            pool_count: pools.len(),
            total_assets: pools.iter().map(|p| p.total_assets).sum(),
            best_rate: pools.iter().map(|p| p.interest_rate).max(),
            account: self.balances.account(),
        })
    }

    #[instrument(skip(self))]
    pub async fn portfolio(&self) -> Result<Portfolio, StakerError> {
        let pools = self.pools.list().await?;
        let (balances, positions) = tokio::try_join!(
            self.balances.account_balances(),
            try_join_all(pools.iter().map(|pool| self.position(pool))),
        )?;

        let mut holdings = Vec::new();
        let mut opportunities = Vec::new();
        for (pool, (shares, value)) in pools.iter().zip(positions) {
            if shares.is_positive() {
                holdings.push(HoldingRow {
                    pool_id: pool.id.clone(),
                    pool_name: pool.name.clone(),
                    token_symbol: pool.token_symbol(),
                    token_price: token_price(pool.exchange_rate),
                    token_balance: shares,
                    value,
                    pnl: Decimal::ZERO,
                });
            } else {
                opportunities.push(Opportunity {
                    pool_id: pool.id.clone(),
                    name: pool.name.clone(),
                    interest_rate: pool.interest_rate,
                    token_price: token_price(pool.exchange_rate),
                });
            }
        }

        Ok(Portfolio {
            liquid_fil: balances.fil.plus(balances.wfil),
            total_deposited: holdings.iter().map(|h| h.value).sum(),
            total_pnl: holdings.iter().map(|h| h.pnl).sum(),
            holdings,
            opportunities,
        })
    }

    /// Shares held in `pool` and their FIL value.
    async fn position(&self, pool: &Pool) -> Result<(FilAmount, FilAmount), StakerError> {
        let shares = self.balances.pool_token_balance(pool.address).await?;
        if !shares.is_positive() {
            return Ok((shares, FilAmount::ZERO));
        }
        let value = self.ledger.convert_to_assets(pool.address, shares).await?;
        Ok((shares, value))
    }

    /// Pool page for `id` on `tab`.
    #[instrument(skip(self))]
    pub async fn pool_page(&self, id: &str, tab: TransactTab) -> Result<PoolPage, StakerError> {
        let pool = self.pools.require(id).await?;

        let (inputs, holdings) = tokio::join!(
            self.balances.eligibility_inputs(pool.address),
            self.balances.pool_token_balance(pool.address),
        );
        let holdings = holdings.unwrap_or_else(|e| {
            warn!(error = %e, "Pool token balance unavailable");
            FilAmount::ZERO
        });

        let eligibility = deposit_eligibility(&inputs);
        let context = PoolFormContext {
            pool_id: pool.id.clone(),
            pool_address: pool.address,
            account: self.balances.account().unwrap_or(Address::ZERO),
            exchange_rate: pool.exchange_rate,
            allowance: inputs.allowance.unwrap_or(FilAmount::ZERO),
            pool_token_balance: holdings,
        };
        let view = transact_view(tab, eligibility, &context);

        Ok(PoolPage {
            pool,
            holdings,
            eligibility,
            tab,
            view,
            context,
        })
    }
}
