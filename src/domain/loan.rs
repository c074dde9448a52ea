//! Loan position of a loan agent in a pool.

use alloy::primitives::U256;
use serde::Serialize;

use super::money::FilAmount;

/// Loan record as returned by `getLoan(borrower)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loan {
    /// Epoch the loan started (raw chain epoch).
    pub start_epoch: U256,
    /// Number of repayment periods.
    pub periods: U256,
    pub principal: FilAmount,
    pub interest: FilAmount,
    pub total_paid: FilAmount,
}

impl Loan {
    /// Principal plus accrued interest.
    pub fn total_owed(&self) -> FilAmount {
        self.principal.plus(self.interest)
    }

    /// True when the agent never borrowed from this pool.
    pub fn is_empty(&self) -> bool {
        self.principal.is_zero() && self.interest.is_zero() && self.total_paid.is_zero()
    }
}

/// Loan plus its live balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanView {
    pub loan: Loan,
    /// `loanBalance(borrower)`: what is owed as of the current epoch.
    pub owed_today: FilAmount,
    /// From the stats contract; `None` when it is not deployed.
    pub has_penalties: Option<bool>,
}

impl LoanView {
    /// Rows shown on the repay page.
    ///
    /// Epoch and period counts are raw integers; money fields are in FIL.
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        let penalty = match self.has_penalties {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "Unknown",
        };
        vec![
            ("Owed today", format!("{} FIL", self.owed_today.to_fil())),
            ("Penalty", penalty.to_string()),
            ("startEpoch", self.loan.start_epoch.to_string()),
            ("periods", self.loan.periods.to_string()),
            ("principal", self.loan.principal.to_fil()),
            ("interest", self.loan.interest.to_fil()),
            ("totalPaid", self.loan.total_paid.to_fil()),
            ("Total owed", format!("{} FIL", self.loan.total_owed().to_fil())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan() -> Loan {
        Loan {
            start_epoch: U256::from(1_200u64),
            periods: U256::from(12u64),
            principal: FilAmount::from_whole_fil(100),
            interest: FilAmount::from_fil("7.5").unwrap(),
            total_paid: FilAmount::from_whole_fil(20),
        }
    }

    #[test]
    fn test_total_owed() {
        assert_eq!(loan().total_owed().to_fil(), "107.5");
    }

    #[test]
    fn test_is_empty() {
        let empty = Loan {
            start_epoch: U256::ZERO,
            periods: U256::ZERO,
            principal: FilAmount::ZERO,
            interest: FilAmount::ZERO,
            total_paid: FilAmount::ZERO,
        };
        assert!(empty.is_empty());
        assert!(!loan().is_empty());
    }

    #[test]
    fn test_lines_render_raw_counts_and_fil_amounts() {
        let view = LoanView {
            loan: loan(),
            owed_today: FilAmount::from_fil("88.2").unwrap(),
            has_penalties: None,
        };
        let lines = view.lines();
        assert_eq!(lines[0], ("Owed today", "88.2 FIL".to_string()));
        assert_eq!(lines[1], ("Penalty", "Unknown".to_string()));
        assert_eq!(lines[2], ("startEpoch", "1200".to_string()));
        assert_eq!(lines[3], ("periods", "12".to_string()));
        assert_eq!(lines[5], ("interest", "7.5".to_string()));
        assert_eq!(lines[7], ("Total owed", "107.5 FIL".to_string()));
    }
}
