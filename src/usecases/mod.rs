//! Use Cases Layer - Application Logic
//!
//! Orchestrates domain logic through port interfaces. Each use case
//! depends only on traits from `crate::ports`, never on concrete
//! adapters, which is what lets the integration tests run on mocks.
//!
//! Use cases:
//! - `poller`: timer and on-demand revalidation of polled reads
//! - `pools`: pool directory from the pool factory
//! - `balances`: FIL, WFIL, allowance and pool token balances
//! - `loans`: loan agent position per pool
//! - `transact`: validated single-transaction submission
//! - `portfolio`: landing, portfolio and pool page views

pub mod balances;
pub mod loans;
pub mod poller;
pub mod pools;
pub mod portfolio;
pub mod transact;

pub use balances::{AccountBalances, BalanceService};
pub use loans::LoanService;
pub use poller::{Resource, Revalidator};
pub use pools::{find_pool, pool_options, PoolDirectory};
pub use portfolio::{HoldingRow, Landing, Opportunity, Portfolio, PoolPage, PortfolioService};
pub use transact::TransactService;
