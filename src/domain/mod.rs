//! Domain layer - pool, loan and money models plus form logic.
//!
//! Pure types with no I/O (hexagonal architecture inner ring). Everything
//! here is testable without a node.

pub mod eligibility;
pub mod format;
pub mod loan;
pub mod money;
pub mod pool;
pub mod transact;

// Re-export core types for convenience
pub use eligibility::{deposit_eligibility, DepositEligibility, EligibilityInputs};
pub use loan::{Loan, LoanView};
pub use money::FilAmount;
pub use pool::Pool;
pub use transact::{transact_view, FormAction, FormTemplate, PoolFormContext, TransactTab, TransactView, TxIntent};
