//! Deposit eligibility.
//!
//! Pools take WFIL, not native FIL, and pull it through an ERC-20
//! allowance. Before a user can deposit they may need to wrap FIL and then
//! grant the pool an allowance.

use serde::Serialize;

use super::money::FilAmount;

/// What the deposit tab should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DepositEligibility {
    /// At least one balance has not been read yet.
    Loading,
    /// No FIL and no WFIL: nothing to deposit.
    NeedsFil,
    /// Has FIL but no WFIL: offer wrapping.
    NeedsWfil,
    /// Has WFIL but the pool may not spend it: offer an approval.
    NeedsWfilAllowance,
    /// Can deposit up to the allowance.
    Ready,
}

impl DepositEligibility {
    /// Status text for states that render no form.
    pub const fn status_text(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some("Loading..."),
            Self::NeedsFil => Some("Need FIL"),
            _ => None,
        }
    }
}

/// Balances the decision depends on. `None` means not loaded yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityInputs {
    pub fil_balance: Option<FilAmount>,
    pub wfil_balance: Option<FilAmount>,
    pub allowance: Option<FilAmount>,
}

/// Decide what the deposit tab offers.
///
/// | WFIL | allowance | result |
/// |------|-----------|--------|
/// | 0    | 0         | NeedsWfil (NeedsFil without FIL) |
/// | 0    | > 0       | NeedsWfil (NeedsFil without FIL) |
/// | > 0  | 0         | NeedsWfilAllowance |
/// | > 0  | > 0       | Ready |
pub fn deposit_eligibility(inputs: &EligibilityInputs) -> DepositEligibility {
    let (Some(fil), Some(wfil), Some(allowance)) =
        (inputs.fil_balance, inputs.wfil_balance, inputs.allowance)
    else {
        return DepositEligibility::Loading;
    };

    match (wfil.is_zero(), allowance.is_zero()) {
        (true, _) if fil.is_zero() => DepositEligibility::NeedsFil,
        (true, _) => DepositEligibility::NeedsWfil,
        (false, true) => DepositEligibility::NeedsWfilAllowance,
        (false, false) => DepositEligibility::Ready,
    }
}
