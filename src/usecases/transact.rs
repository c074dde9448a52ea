//! Form submission: validate, prepare, then send exactly one transaction.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{error, info, instrument, warn};

use crate::domain::transact::require_positive;
use crate::domain::{FilAmount, FormTemplate, PoolFormContext, Pool, TxIntent};
use crate::error::StakerError;
use crate::ports::ledger::{LedgerWriter, TxOutcome};
use crate::ports::telemetry::Telemetry;

pub struct TransactService<W: LedgerWriter> {
    writer: Arc<W>,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl<W: LedgerWriter> TransactService<W> {
    pub fn new(writer: Arc<W>) -> Self {
        Self { writer, telemetry: None }
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Send `intent`.
    ///
    /// Non-positive amounts are rejected before anything reaches the
    /// node, and a failed preparation blocks submission.
    #[instrument(skip(self, intent), fields(action = intent.label(), amount_atto = %intent.amount().to_atto()))]
    pub async fn submit(&self, intent: TxIntent) -> Result<TxOutcome, StakerError> {
        let action = intent.label();

        if let Err(e) = require_positive(intent.amount()) {
            self.blocked(action, &e);
            return Err(e);
        }

        let prepared = match self.writer.prepare(&intent).await {
            Ok(prepared) => prepared,
            Err(e) => {
                self.blocked(action, &e);
                return Err(e);
            }
        };

        match self.writer.submit(prepared).await {
            Ok(outcome) => {
                let label = if outcome.success { "success" } else { "reverted" };
                self.count_submitted(action, label);
                if outcome.success {
                    info!(tx_hash = %outcome.tx_hash, block = ?outcome.block_number, "Transaction confirmed");
                } else {
                    warn!(tx_hash = %outcome.tx_hash, "Transaction reverted");
                }
                Ok(outcome)
            }
            Err(e) => {
                self.count_submitted(action, "error");
                error!(error = %e, "Transaction submission failed");
                Err(e)
            }
        }
    }

    /// Submit what a pool form sends for `amount`.
    pub async fn submit_form(
        &self,
        form: &FormTemplate,
        amount: FilAmount,
        ctx: &PoolFormContext,
    ) -> Result<TxOutcome, StakerError> {
        let intent = match form.intent(amount, ctx) {
            Ok(intent) => intent,
            Err(e) => {
                self.blocked("form", &e);
                return Err(e);
            }
        };
        self.submit(intent).await
    }

    /// `pool.borrow(amount, loanAgent)`.
    pub async fn borrow(&self, pool: &Pool, amount: FilAmount, loan_agent: Address) -> Result<TxOutcome, StakerError> {
        if pool.is_placeholder() {
            return Err(StakerError::UnknownPool(pool.id.clone()));
        }
        self.submit(TxIntent::Borrow {
            pool: pool.address,
            amount,
            loan_agent,
        })
        .await
    }

    /// `pool.repay(amount, loanAgent, payee)`.
    pub async fn repay(
        &self,
        pool: &Pool,
        amount: FilAmount,
        loan_agent: Address,
        payee: Address,
    ) -> Result<TxOutcome, StakerError> {
        if pool.is_placeholder() {
            return Err(StakerError::UnknownPool(pool.id.clone()));
        }
        self.submit(TxIntent::Repay {
            pool: pool.address,
            amount,
            loan_agent,
            payee,
        })
        .await
    }

    fn blocked(&self, action: &str, reason: &StakerError) {
        warn!(action, error = %reason, "Transaction blocked before sending");
        if let Some(t) = &self.telemetry {
            t.tx_blocked(action);
        }
    }

    fn count_submitted(&self, action: &str, outcome: &str) {
        if let Some(t) = &self.telemetry {
            t.tx_submitted(action, outcome);
        }
    }
}
