//! Loan position of the loan agent in a pool.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{instrument, warn};

use crate::domain::{LoanView, Pool};
use crate::error::StakerError;
use crate::ports::ledger::LedgerReader;

pub struct LoanService<R: LedgerReader> {
    ledger: Arc<R>,
}

impl<R: LedgerReader> LoanService<R> {
    pub fn new(ledger: Arc<R>) -> Self {
        Self { ledger }
    }

    /// Loan, live balance and penalty flag of `agent` in `pool`.
    ///
    /// `None` for the placeholder pool. An unreadable penalty flag is
    /// reported as unknown rather than failing the view.
    #[instrument(skip(self, pool), fields(pool = %pool.id))]
    pub async fn loan_view(&self, pool: &Pool, agent: Address) -> Result<Option<LoanView>, StakerError> {
        if pool.is_placeholder() {
            return Ok(None);
        }

        let (loan, owed_today, penalties) = tokio::join!(
            self.ledger.loan(pool.address, agent),
            self.ledger.loan_balance(pool.address, agent),
            self.ledger.has_penalties(agent),
        );

        let has_penalties = penalties.unwrap_or_else(|e| {
            warn!(error = %e, "Penalty flag unavailable");
            None
        });

        Ok(Some(LoanView {
            loan: loan?,
            owed_today: owed_today?,
            has_penalties,
        }))
    }
}
