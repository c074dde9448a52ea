//! Account balances: native FIL, WFIL, allowances and pool shares.
//!
//! Per-account reads are scoped to the session's address. Without an
//! address the balance reads return zero, and eligibility inputs stay
//! unknown.

use std::sync::Arc;

use alloy::primitives::Address;
use serde::Serialize;
use tracing::{instrument, warn};

use crate::domain::{EligibilityInputs, FilAmount};
use crate::error::StakerError;
use crate::ports::ledger::LedgerReader;
use crate::ports::session::WalletSession;

/// Native and wrapped balances of the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalances {
    pub fil: FilAmount,
    pub wfil: FilAmount,
}

pub struct BalanceService<R: LedgerReader, S: WalletSession> {
    ledger: Arc<R>,
    session: Arc<S>,
}

impl<R: LedgerReader, S: WalletSession> Clone for BalanceService<R, S> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            session: Arc::clone(&self.session),
        }
    }
}

impl<R: LedgerReader, S: WalletSession> BalanceService<R, S> {
    pub fn new(ledger: Arc<R>, session: Arc<S>) -> Self {
        Self { ledger, session }
    }

    pub fn account(&self) -> Option<Address> {
        self.session.address()
    }

    /// Native FIL balance; zero when disconnected.
    pub async fn fil_balance(&self) -> Result<FilAmount, StakerError> {
        if self.session.address().is_none() {
            return Ok(FilAmount::ZERO);
        }
        self.session.balance().await
    }

    /// WFIL balance; zero when disconnected.
    pub async fn wfil_balance(&self) -> Result<FilAmount, StakerError> {
        match self.session.address() {
            Some(owner) => self.ledger.wfil_balance(owner).await,
            None => Ok(FilAmount::ZERO),
        }
    }

    /// WFIL the account allows `spender` to move; zero when disconnected.
    pub async fn allowance(&self, spender: Address) -> Result<FilAmount, StakerError> {
        match self.session.address() {
            Some(owner) => self.ledger.wfil_allowance(owner, spender).await,
            None => Ok(FilAmount::ZERO),
        }
    }

    /// Pool shares held by the account; zero when disconnected.
    pub async fn pool_token_balance(&self, pool: Address) -> Result<FilAmount, StakerError> {
        match self.session.address() {
            Some(owner) => self.ledger.pool_token_balance(pool, owner).await,
            None => Ok(FilAmount::ZERO),
        }
    }

    #[instrument(skip(self))]
    pub async fn account_balances(&self) -> Result<AccountBalances, StakerError> {
        let (fil, wfil) = tokio::try_join!(self.fil_balance(), self.wfil_balance())?;
        Ok(AccountBalances { fil, wfil })
    }

    /// Inputs for the deposit eligibility table of `pool`.
    ///
    /// A failed read leaves its input unknown, which keeps the table in
    /// its loading state.
    #[instrument(skip(self))]
    pub async fn eligibility_inputs(&self, pool: Address) -> EligibilityInputs {
        let Some(owner) = self.session.address() else {
            return EligibilityInputs::default();
        };

        let (fil, wfil, allowance) = tokio::join!(
            self.session.balance(),
            self.ledger.wfil_balance(owner),
            self.ledger.wfil_allowance(owner, pool),
        );

        EligibilityInputs {
            fil_balance: known("fil_balance", fil),
            wfil_balance: known("wfil_balance", wfil),
            allowance: known("allowance", allowance),
        }
    }
}

fn known(input: &'static str, result: Result<FilAmount, StakerError>) -> Option<FilAmount> {
    result
        .map_err(|e| warn!(input, error = %e, "Eligibility input unavailable"))
        .ok()
}
