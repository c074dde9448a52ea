//! Pool directory: enumerate the factory's pools and read their stats.

use std::sync::Arc;

use futures_util::future::try_join_all;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::domain::{FilAmount, Pool};
use crate::error::StakerError;
use crate::ports::ledger::LedgerReader;

/// Reads pools from the pool factory.
pub struct PoolDirectory<R: LedgerReader> {
    ledger: Arc<R>,
}

impl<R: LedgerReader> Clone for PoolDirectory<R> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<R: LedgerReader> PoolDirectory<R> {
    pub fn new(ledger: Arc<R>) -> Self {
        Self { ledger }
    }

    /// Every pool in factory order.
    ///
    /// One `allPoolsLength` read, then per pool its address followed by
    /// four concurrent reads. Any failed read fails the whole listing.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Pool>, StakerError> {
        let count = self.ledger.pool_count().await?;
        debug!(count, "Pool count read");
        try_join_all((0..count).map(|index| self.pool_at(index))).await
    }

    /// Pool at factory index `index`.
    pub async fn pool_at(&self, index: u64) -> Result<Pool, StakerError> {
        let address = self.ledger.pool_address(index).await?;

        let (name, shares_per_fil, interest_rate, total_assets) = tokio::try_join!(
            self.ledger.pool_name(address),
            self.ledger.preview_deposit(address, FilAmount::from_whole_fil(1)),
            self.ledger.interest_rate(address),
            self.ledger.total_assets(address),
        )?;

        Ok(Pool {
            id: index.to_string(),
            address,
            name,
            exchange_rate: shares_per_fil.to_decimal().unwrap_or(Decimal::ZERO),
            interest_rate,
            total_assets,
        })
    }

    /// Pool with `id`, or the placeholder when it does not exist.
    pub async fn pool_or_placeholder(&self, id: &str) -> Result<Pool, StakerError> {
        let pools = self.list().await?;
        Ok(find_pool(&pools, id))
    }

    /// Pool with `id`; unknown ids are an error.
    pub async fn require(&self, id: &str) -> Result<Pool, StakerError> {
        let pool = self.pool_or_placeholder(id).await?;
        if pool.is_placeholder() {
            return Err(StakerError::UnknownPool(id.to_string()));
        }
        Ok(pool)
    }
}

/// Lookup by id; unknown ids and unloaded lists yield the placeholder.
pub fn find_pool(pools: &[Pool], id: &str) -> Pool {
    pools
        .iter()
        .find(|pool| pool.id == id)
        .cloned()
        .unwrap_or_else(Pool::placeholder)
}

/// `(id, name)` options for the borrow and repay pool pickers.
pub fn pool_options(pools: &[Pool]) -> Vec<(String, String)> {
    pools.iter().map(|pool| (pool.id.clone(), pool.name.clone())).collect()
}
