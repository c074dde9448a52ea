//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to verify that money handling, deposit eligibility and
//! form building hold across random inputs.

use alloy::primitives::{Address, U256};
use proptest::prelude::*;
use rust_decimal::Decimal;

use staker::domain::transact::transact_view;
use staker::domain::{
    deposit_eligibility, DepositEligibility, EligibilityInputs, FilAmount, PoolFormContext, TransactTab,
    TransactView,
};

fn atto(n: u128) -> FilAmount {
    FilAmount::from_atto_u128(n)
}

// ── Money Properties ────────────────────────────────────────

proptest! {
    /// Rendering to FIL and parsing back is lossless.
    #[test]
    fn fil_string_parses_back(n in 0u128..u128::MAX / 2) {
        let amount = atto(n);
        let parsed = FilAmount::from_fil(&amount.to_fil()).unwrap();
        prop_assert_eq!(parsed, amount);
    }

    /// The FIL rendering never carries trailing fractional zeros.
    #[test]
    fn fil_string_is_trimmed(n in 0u128..10u128.pow(30)) {
        let text = atto(n).to_fil();
        if let Some((_, frac)) = text.split_once('.') {
            prop_assert!(!frac.is_empty());
            prop_assert!(!frac.ends_with('0'), "untrimmed: {text}");
        }
    }

    /// Addition keeps ordering and undoes with saturating subtraction.
    #[test]
    fn plus_is_monotonic(a in 0u128..u128::MAX / 4, b in 0u128..u128::MAX / 4) {
        let sum = atto(a).plus(atto(b));
        prop_assert!(sum >= atto(a));
        prop_assert!(sum >= atto(b));
        prop_assert_eq!(sum.saturating_minus(atto(b)), atto(a));
        prop_assert_eq!(sum.to_atto(), U256::from(a) + U256::from(b));
    }

    /// Subtraction never underflows.
    #[test]
    fn saturating_minus_clamps(a in any::<u64>(), b in any::<u64>()) {
        let diff = atto(u128::from(a)).saturating_minus(atto(u128::from(b)));
        if a <= b {
            prop_assert!(diff.is_zero());
        } else {
            prop_assert_eq!(diff, atto(u128::from(a - b)));
        }
    }

    /// Scaling by a rate at most one never grows the amount.
    #[test]
    fn times_fraction_never_grows(n in any::<u64>(), bps in 0u32..=10_000) {
        let rate = Decimal::new(i64::from(bps), 4);
        let scaled = atto(u128::from(n)).times(rate);
        prop_assert!(scaled <= atto(u128::from(n)));
    }

    /// Negative input never parses.
    #[test]
    fn negative_input_rejected(whole in 1u32..1_000_000) {
        let input = format!("-{whole}");
        prop_assert!(FilAmount::from_fil(&input).is_err());
    }
}

// ── Eligibility Properties ──────────────────────────────────

fn maybe_amount() -> impl Strategy<Value = Option<FilAmount>> {
    prop_oneof![
        Just(None),
        Just(Some(FilAmount::ZERO)),
        (1u64..1_000_000).prop_map(|n| Some(FilAmount::from_atto_u128(u128::from(n)))),
    ]
}

proptest! {
    /// Any unknown input keeps the tab loading.
    #[test]
    fn unknown_input_is_loading(fil in maybe_amount(), wfil in maybe_amount(), allowance in maybe_amount()) {
        let inputs = EligibilityInputs { fil_balance: fil, wfil_balance: wfil, allowance };
        let decided = deposit_eligibility(&inputs);
        let any_unknown = fil.is_none() || wfil.is_none() || allowance.is_none();
        prop_assert_eq!(decided == DepositEligibility::Loading, any_unknown);
    }

    /// Ready requires both WFIL and an allowance.
    #[test]
    fn ready_requires_wfil_and_allowance(fil in maybe_amount(), wfil in maybe_amount(), allowance in maybe_amount()) {
        let inputs = EligibilityInputs { fil_balance: fil, wfil_balance: wfil, allowance };
        if deposit_eligibility(&inputs) == DepositEligibility::Ready {
            prop_assert!(wfil.is_some_and(|w| w.is_positive()));
            prop_assert!(allowance.is_some_and(|a| a.is_positive()));
        }
    }

    /// The withdraw tab always renders a form, whatever the deposit state.
    #[test]
    fn withdraw_tab_always_has_form(fil in maybe_amount(), wfil in maybe_amount(), allowance in maybe_amount()) {
        let eligibility = deposit_eligibility(&EligibilityInputs { fil_balance: fil, wfil_balance: wfil, allowance });
        let ctx = PoolFormContext {
            pool_id: "3".into(),
            pool_address: Address::repeat_byte(0x03),
            account: Address::repeat_byte(0x0a),
            exchange_rate: Decimal::ONE,
            allowance: allowance.unwrap_or_default(),
            pool_token_balance: FilAmount::ZERO,
        };
        let view = transact_view(TransactTab::Withdraw, eligibility, &ctx);
        prop_assert!(matches!(view, TransactView::Form(_)));
    }
}
