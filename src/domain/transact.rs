//! Transaction forms and intents.
//!
//! A form collects one amount and produces exactly one [`TxIntent`]. The
//! deposit tab picks its form from [`DepositEligibility`]; the withdraw tab
//! always shows the withdraw form.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use rust_decimal::Decimal;
use serde::Serialize;

use super::eligibility::DepositEligibility;
use super::format::pool_token_symbol;
use super::money::FilAmount;
use crate::error::StakerError;

/// Tabs on the pool page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactTab {
    Deposit,
    Withdraw,
}

impl fmt::Display for TransactTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => write!(f, "DEPOSIT"),
            Self::Withdraw => write!(f, "WITHDRAW"),
        }
    }
}

impl FromStr for TransactTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deposit" => Ok(Self::Deposit),
            "withdraw" => Ok(Self::Withdraw),
            other => Err(format!("unknown tab {other:?}")),
        }
    }
}

/// One on-chain write the client can issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TxIntent {
    /// `WFIL.deposit()` with `amount` attached as value.
    WrapFil { amount: FilAmount },
    /// `WFIL.approve(spender, amount)`.
    ApproveWfil { spender: Address, amount: FilAmount },
    /// `pool.deposit(amount, receiver)`.
    DepositPool { pool: Address, amount: FilAmount, receiver: Address },
    /// `pool.withdraw(amount, receiver, owner)`.
    WithdrawPool { pool: Address, amount: FilAmount, receiver: Address, owner: Address },
    /// `pool.borrow(amount, loanAgent)`.
    Borrow { pool: Address, amount: FilAmount, loan_agent: Address },
    /// `pool.repay(amount, loanAgent, payee)`.
    Repay { pool: Address, amount: FilAmount, loan_agent: Address, payee: Address },
}

impl TxIntent {
    /// Amount the transaction moves.
    pub const fn amount(&self) -> FilAmount {
        match self {
            Self::WrapFil { amount }
            | Self::ApproveWfil { amount, .. }
            | Self::DepositPool { amount, .. }
            | Self::WithdrawPool { amount, .. }
            | Self::Borrow { amount, .. }
            | Self::Repay { amount, .. } => *amount,
        }
    }

    /// Short name used in logs and metrics labels.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::WrapFil { .. } => "wrap",
            Self::ApproveWfil { .. } => "approve",
            Self::DepositPool { .. } => "deposit",
            Self::WithdrawPool { .. } => "withdraw",
            Self::Borrow { .. } => "borrow",
            Self::Repay { .. } => "repay",
        }
    }
}

/// Reject zero amounts before anything touches the chain.
///
/// `FilAmount` cannot be negative, so a failed parse upstream covers the
/// negative case.
pub fn require_positive(amount: FilAmount) -> Result<FilAmount, StakerError> {
    if amount.is_positive() {
        Ok(amount)
    } else {
        Err(StakerError::InvalidAmount(format!("{amount} is not positive")))
    }
}

/// Which write a form submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormAction {
    WrapFil,
    GrantAllowance,
    Deposit,
    Withdraw,
}

impl FormAction {
    /// Button label of the form that submits this action.
    pub const fn submit_label(self) -> &'static str {
        match self {
            Self::WrapFil => "GET WFIL",
            Self::GrantAllowance => "GRANT ALLOWANCE",
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
        }
    }
}

/// Everything a pool form needs to know about the pool and the account.
#[derive(Debug, Clone)]
pub struct PoolFormContext {
    pub pool_id: String,
    pub pool_address: Address,
    pub account: Address,
    pub exchange_rate: Decimal,
    pub allowance: FilAmount,
    pub pool_token_balance: FilAmount,
}

/// Rendered form: labels plus the action it submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormTemplate {
    pub header: String,
    pub input_label: &'static str,
    pub submit_label: &'static str,
    pub token_name: String,
    pub exchange_rate_label: Option<String>,
    pub exchange_rate: Decimal,
    pub action: FormAction,
}

impl FormTemplate {
    /// "Receive ..." preview under the input; only forms with an exchange
    /// rate label show one.
    pub fn receive_preview(&self, amount: FilAmount) -> Option<String> {
        self.exchange_rate_label.as_ref()?;
        Some(format!(
            "Receive {} {}",
            amount.times(self.exchange_rate).to_fil(),
            self.token_name
        ))
    }

    /// This form, if it submits `action`.
    pub fn require_action(&self, action: FormAction) -> Result<&Self, StakerError> {
        if self.action == action {
            Ok(self)
        } else {
            Err(StakerError::FormUnavailable {
                requested: action.submit_label(),
                offered: self.submit_label,
            })
        }
    }

    /// Turn a submitted amount into the transaction this form sends.
    pub fn intent(&self, amount: FilAmount, ctx: &PoolFormContext) -> Result<TxIntent, StakerError> {
        let amount = require_positive(amount)?;
        Ok(match self.action {
            FormAction::WrapFil => TxIntent::WrapFil { amount },
            FormAction::GrantAllowance => TxIntent::ApproveWfil {
                spender: ctx.pool_address,
                amount,
            },
            FormAction::Deposit => TxIntent::DepositPool {
                pool: ctx.pool_address,
                amount,
                receiver: ctx.account,
            },
            FormAction::Withdraw => TxIntent::WithdrawPool {
                pool: ctx.pool_address,
                amount,
                receiver: ctx.account,
                owner: ctx.account,
            },
        })
    }
}

/// What the transact panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactView {
    /// A status line with no form (loading, needs FIL).
    Status(&'static str),
    Form(FormTemplate),
}

/// Build the transact panel for a tab and eligibility state.
pub fn transact_view(tab: TransactTab, eligibility: DepositEligibility, ctx: &PoolFormContext) -> TransactView {
    let symbol = pool_token_symbol(&ctx.pool_id);

    if tab == TransactTab::Withdraw {
        return TransactView::Form(FormTemplate {
            header: format!("Your balance: {} {symbol}", ctx.pool_token_balance.to_fil()),
            input_label: "Withdraw Amount",
            submit_label: FormAction::Withdraw.submit_label(),
            token_name: "FIL".into(),
            exchange_rate_label: Some(format!("1 FIL = {} {symbol}", ctx.exchange_rate.normalize())),
            exchange_rate: Decimal::ONE,
            action: FormAction::Withdraw,
        });
    }

    if let Some(status) = eligibility.status_text() {
        return TransactView::Status(status);
    }

    TransactView::Form(match eligibility {
        DepositEligibility::NeedsWfil => FormTemplate {
            header: "In order to deposit $FIL into this pool, you must first convert $FIL into $WFIL.".into(),
            input_label: "Deposit Amount",
            submit_label: FormAction::WrapFil.submit_label(),
            token_name: "WFIL".into(),
            exchange_rate_label: Some("1 FIL = 1 WFIL".into()),
            exchange_rate: Decimal::ONE,
            action: FormAction::WrapFil,
        },
        DepositEligibility::NeedsWfilAllowance => FormTemplate {
            header: "In order to deposit WFIL into this pool, you must grant the pool an allowance to spend the amount you wish to deposit.".into(),
            input_label: "Allowance Amount",
            submit_label: FormAction::GrantAllowance.submit_label(),
            token_name: symbol,
            exchange_rate_label: None,
            exchange_rate: ctx.exchange_rate,
            action: FormAction::GrantAllowance,
        },
        _ => FormTemplate {
            header: format!("Available to deposit: {} WFIL", ctx.allowance.to_fil()),
            input_label: "Deposit Amount",
            submit_label: FormAction::Deposit.submit_label(),
            exchange_rate_label: Some(format!("1 WFIL = {} {symbol}", ctx.exchange_rate.normalize())),
            token_name: symbol,
            exchange_rate: ctx.exchange_rate,
            action: FormAction::Deposit,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ctx() -> PoolFormContext {
        PoolFormContext {
            pool_id: "0".into(),
            pool_address: "0x00000000000000000000000000000000000000a1".parse().unwrap(),
            account: "0x00000000000000000000000000000000000000b2".parse().unwrap(),
            exchange_rate: dec!(2),
            allowance: FilAmount::from_whole_fil(40),
            pool_token_balance: FilAmount::from_fil("12.5").unwrap(),
        }
    }

    fn form(view: TransactView) -> FormTemplate {
        match view {
            TransactView::Form(f) => f,
            TransactView::Status(s) => panic!("expected a form, got status {s}"),
        }
    }

    #[test]
    fn test_status_states_render_no_form() {
        assert_eq!(
            transact_view(TransactTab::Deposit, DepositEligibility::Loading, &ctx()),
            TransactView::Status("Loading...")
        );
        assert_eq!(
            transact_view(TransactTab::Deposit, DepositEligibility::NeedsFil, &ctx()),
            TransactView::Status("Need FIL")
        );
    }

    #[test]
    fn test_ready_form_labels_and_preview() {
        let f = form(transact_view(TransactTab::Deposit, DepositEligibility::Ready, &ctx()));
        assert_eq!(f.header, "Available to deposit: 40 WFIL");
        assert_eq!(f.exchange_rate_label.as_deref(), Some("1 WFIL = 2 P0GLIF"));
        assert_eq!(f.submit_label, "DEPOSIT");
        assert_eq!(
            f.receive_preview(FilAmount::from_fil("1.5").unwrap()).as_deref(),
            Some("Receive 3 P0GLIF")
        );
    }

    #[test]
    fn test_allowance_form_has_no_preview() {
        let f = form(transact_view(TransactTab::Deposit, DepositEligibility::NeedsWfilAllowance, &ctx()));
        assert_eq!(f.submit_label, "GRANT ALLOWANCE");
        assert!(f.receive_preview(FilAmount::from_whole_fil(1)).is_none());
    }

    #[test]
    fn test_withdraw_tab_ignores_eligibility() {
        let f = form(transact_view(TransactTab::Withdraw, DepositEligibility::Loading, &ctx()));
        assert_eq!(f.header, "Your balance: 12.5 P0GLIF");
        assert_eq!(f.action, FormAction::Withdraw);
        assert_eq!(
            f.receive_preview(FilAmount::from_whole_fil(3)).as_deref(),
            Some("Receive 3 FIL")
        );
    }

    #[test]
    fn test_intents_target_pool_and_account() {
        let c = ctx();
        let amount = FilAmount::from_whole_fil(1);

        let deposit = form(transact_view(TransactTab::Deposit, DepositEligibility::Ready, &c));
        assert_eq!(
            deposit.intent(amount, &c).unwrap(),
            TxIntent::DepositPool { pool: c.pool_address, amount, receiver: c.account }
        );

        let approve = form(transact_view(TransactTab::Deposit, DepositEligibility::NeedsWfilAllowance, &c));
        assert_eq!(
            approve.intent(amount, &c).unwrap(),
            TxIntent::ApproveWfil { spender: c.pool_address, amount }
        );

        let withdraw = form(transact_view(TransactTab::Withdraw, DepositEligibility::Ready, &c));
        assert_eq!(
            withdraw.intent(amount, &c).unwrap(),
            TxIntent::WithdrawPool { pool: c.pool_address, amount, receiver: c.account, owner: c.account }
        );
    }

    #[test]
    fn test_zero_amount_produces_no_intent() {
        let c = ctx();
        for eligibility in [DepositEligibility::NeedsWfil, DepositEligibility::NeedsWfilAllowance, DepositEligibility::Ready] {
            let f = form(transact_view(TransactTab::Deposit, eligibility, &c));
            assert!(matches!(f.intent(FilAmount::ZERO, &c), Err(StakerError::InvalidAmount(_))));
        }
    }

    #[test]
    fn test_require_action_rejects_other_forms() {
        let c = ctx();
        let wrap = form(transact_view(TransactTab::Deposit, DepositEligibility::NeedsWfil, &c));
        let err = wrap.require_action(FormAction::Deposit).unwrap_err();
        assert!(err.blocked_before_send());
        assert_eq!(err.to_string(), "pool form offers GET WFIL, not DEPOSIT");

        let ready = form(transact_view(TransactTab::Deposit, DepositEligibility::Ready, &c));
        assert_eq!(ready.require_action(FormAction::Deposit).unwrap(), &ready);
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!("Deposit".parse::<TransactTab>().unwrap(), TransactTab::Deposit);
        assert_eq!("withdraw".parse::<TransactTab>().unwrap(), TransactTab::Withdraw);
        assert!("borrow".parse::<TransactTab>().is_err());
        assert_eq!(TransactTab::Withdraw.to_string(), "WITHDRAW");
    }
}
