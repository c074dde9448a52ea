//! Pool model as read from the pool factory and pool contracts.

use alloy::primitives::Address;
use rust_decimal::Decimal;
use serde::Serialize;

use super::format::{friendly_balance, friendly_decimal, percent, pool_token_symbol, truncate_address, FRIENDLY_DECIMALS};
use super::money::FilAmount;

/// A lending pool.
///
/// Every field is a projection of contract state; the client never writes
/// these values, it only sends transactions that make the contract
/// recompute them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pool {
    /// Index in the pool factory, as a decimal string.
    pub id: String,
    pub address: Address,
    pub name: String,
    /// Pool shares received per FIL deposited.
    pub exchange_rate: Decimal,
    /// Raw interest rate; rendered with [`percent`].
    pub interest_rate: FilAmount,
    pub total_assets: FilAmount,
}

impl Pool {
    /// Empty pool returned while the directory is loading or when the
    /// requested id does not exist.
    pub fn placeholder() -> Self {
        Self {
            id: String::new(),
            address: Address::ZERO,
            name: String::new(),
            exchange_rate: Decimal::ZERO,
            interest_rate: FilAmount::ZERO,
            total_assets: FilAmount::ZERO,
        }
    }

    /// True for the stand-in returned for unknown pool ids.
    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty()
    }

    /// Share token symbol, e.g. `P0GLIF`.
    pub fn token_symbol(&self) -> String {
        pool_token_symbol(&self.id)
    }

    /// On-chain stats block shown on the pool page.
    pub fn stat_lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Pool #", self.id.clone()),
            ("Pool Address", truncate_address(&self.address)),
            ("Name", self.name.clone()),
            ("Current APY", percent(&self.interest_rate)),
            ("Total Assets", format!("{} FIL", self.total_assets.to_fil())),
            (
                "Exchange Rate",
                format!(
                    "1 FIL = {} {}",
                    friendly_decimal(self.exchange_rate, FRIENDLY_DECIMALS, false),
                    self.token_symbol()
                ),
            ),
        ]
    }

    /// Summary line used by the borrow and repay pool pickers.
    pub fn picker_lines(&self) -> Vec<(&'static str, String)> {
        if self.is_placeholder() {
            return Vec::new();
        }
        vec![
            ("Interest rate", format!("{} APR", percent(&self.interest_rate))),
            (
                "Total assets",
                format!("{} FIL", friendly_balance(&self.total_assets, FRIENDLY_DECIMALS, false)),
            ),
        ]
    }
}
