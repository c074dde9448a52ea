//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use cases require from the
//! outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `LedgerReader` / `LedgerWriter`: lending contract calls
//! - `WalletSession`: connected account and native balance
//! - `Telemetry`: poll and transaction counters

pub mod ledger;
pub mod session;
pub mod telemetry;

pub use ledger::{LedgerReader, LedgerWriter, PreparedTx, TxOutcome};
pub use session::WalletSession;
pub use telemetry::Telemetry;
