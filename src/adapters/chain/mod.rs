//! Chain Adapters - Node Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider management with an optional local signer
//! - Lending contract reads and writes (pools, WFIL, stats)
//! - The connected wallet session
//! - Digest address validation at startup

pub mod bindings;
pub mod ledger;
pub mod provider;
pub mod session;
pub mod validator;

pub use ledger::{EvmLedger, LedgerAddresses};
pub use provider::{signer_from_env, NodeProvider};
pub use session::ChainSession;
pub use validator::ContractValidator;
