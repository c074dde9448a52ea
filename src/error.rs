//! Client error taxonomy.
//!
//! The client only distinguishes three failure families: a contract read
//! failed, a write could not be prepared or submitted, or the local inputs
//! (digest, amount, pool selection, wallet) are unusable. Loading is not an
//! error; it is modelled by `usecases::poller::Resource::Loading`.

use thiserror::Error;

/// Boxed source error carried by contract call failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the staker library.
#[derive(Debug, Error)]
pub enum StakerError {
    /// A `view` call against a contract failed or returned undecodable data.
    #[error("contract read {contract}.{method} failed: {source}")]
    ContractRead {
        contract: &'static str,
        method: &'static str,
        #[source]
        source: BoxError,
    },

    /// Gas estimation / simulation rejected the transaction before sending.
    #[error("{action} could not be prepared: {source}")]
    Preparation {
        action: &'static str,
        #[source]
        source: BoxError,
    },

    /// The node refused the transaction or the receipt could not be fetched.
    #[error("{action} submission failed: {source}")]
    Submission {
        action: &'static str,
        #[source]
        source: BoxError,
    },

    /// The contract digest is missing, malformed, or lacks a contract.
    #[error("contract digest: {0}")]
    Digest(String),

    /// A write was requested without a signing wallet.
    #[error("no wallet connected")]
    NotConnected,

    /// Amount input was zero, negative, or not a number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The pool page offers a different form than the one requested.
    #[error("pool form offers {offered}, not {requested}")]
    FormUnavailable {
        requested: &'static str,
        offered: &'static str,
    },

    /// The selected pool id is not in the pool directory.
    #[error("unknown pool {0:?}")]
    UnknownPool(String),
}

impl StakerError {
    /// Wrap a failed contract read.
    pub fn read<E>(contract: &'static str, method: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::ContractRead {
            contract,
            method,
            source: source.into(),
        }
    }

    /// True for failures that happened before anything was sent on-chain.
    pub const fn blocked_before_send(&self) -> bool {
        matches!(
            self,
            Self::Preparation { .. }
                | Self::InvalidAmount(_)
                | Self::NotConnected
                | Self::FormUnavailable { .. }
                | Self::UnknownPool(_)
        )
    }
}

/// Convenience alias used across the library.
pub type Result<T> = std::result::Result<T, StakerError>;
