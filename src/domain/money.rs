//! FIL money amounts.
//!
//! `FilAmount` is a thin decoration over the chain's `U256` integer
//! denominated in attoFIL (10^-18 FIL). Parsing and formatting go through
//! alloy's unit helpers; rate multiplication goes through `rust_decimal`'s
//! mantissa/scale so no precision is lost on the integer side.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use alloy::primitives::utils::{format_ether, parse_ether};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StakerError;

/// Number of decimals between FIL and attoFIL.
pub const FIL_DECIMALS: u32 = 18;

/// One FIL expressed in attoFIL.
pub const ATTO_PER_FIL: u128 = 1_000_000_000_000_000_000;

/// A non-negative amount of FIL (or of an 18-decimal pool token).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilAmount(U256);

impl FilAmount {
    /// Zero FIL.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Wrap a raw attoFIL integer as returned by a contract.
    pub const fn from_atto(atto: U256) -> Self {
        Self(atto)
    }

    /// Convenience constructor for test fixtures and constants.
    pub fn from_atto_u128(atto: u128) -> Self {
        Self(U256::from(atto))
    }

    /// Whole FIL.
    pub fn from_whole_fil(fil: u64) -> Self {
        Self(U256::from(fil) * U256::from(ATTO_PER_FIL))
    }

    /// Parse a decimal FIL string such as `"1.25"`.
    ///
    /// Negative and malformed inputs are rejected. Digits past the 18th
    /// decimal are truncated by the unit parser.
    pub fn from_fil(input: &str) -> Result<Self, StakerError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(StakerError::InvalidAmount("empty".into()));
        }
        if trimmed.starts_with('-') {
            return Err(StakerError::InvalidAmount(format!("{trimmed} is negative")));
        }
        parse_ether(trimmed)
            .map(Self)
            .map_err(|e| StakerError::InvalidAmount(format!("{trimmed}: {e}")))
    }

    /// Raw attoFIL value, as passed to contract calls.
    pub const fn to_atto(&self) -> U256 {
        self.0
    }

    /// FIL rendering with trailing zeros stripped (`"1.5"`, `"0"`).
    pub fn to_fil(&self) -> String {
        trim_fraction(&format_ether(self.0))
    }

    /// Decimal value in FIL, if it fits in a `Decimal` mantissa.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let atto = i128::try_from(u128::try_from(self.0).ok()?).ok()?;
        Decimal::try_from_i128_with_scale(atto, FIL_DECIMALS)
            .ok()
            .map(|d| d.normalize())
    }

    /// True for exactly zero attoFIL.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// True for any non-zero amount; amounts are never negative.
    pub fn is_positive(&self) -> bool {
        !self.0.is_zero()
    }

    /// Sum, saturating at `U256::MAX`.
    #[must_use]
    pub fn plus(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Difference clamped at zero.
    #[must_use]
    pub fn saturating_minus(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiply by a decimal rate, rounding toward zero.
    ///
    /// Negative rates yield zero.
    #[must_use]
    pub fn times(&self, rate: Decimal) -> Self {
        if rate.is_sign_negative() || rate.is_zero() {
            return Self::ZERO;
        }
        let mantissa = U256::from(rate.mantissa().unsigned_abs());
        let scale = U256::from(10u64).pow(U256::from(rate.scale()));
        Self(self.0.saturating_mul(mantissa) / scale)
    }
}

impl fmt::Display for FilAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fil())
    }
}

impl FromStr for FilAmount {
    type Err = StakerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fil(s)
    }
}

impl From<U256> for FilAmount {
    fn from(atto: U256) -> Self {
        Self(atto)
    }
}

impl std::iter::Sum for FilAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc.plus(x))
    }
}

impl Serialize for FilAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_fil())
    }
}

impl<'de> Deserialize<'de> for FilAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_fil(&raw).map_err(serde::de::Error::custom)
    }
}

/// Strip trailing fractional zeros and a dangling decimal point.
pub(crate) fn trim_fraction(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_fil_strips_trailing_zeros() {
        assert_eq!(FilAmount::from_atto_u128(1_500_000_000_000_000_000).to_fil(), "1.5");
        assert_eq!(FilAmount::ZERO.to_fil(), "0");
        assert_eq!(FilAmount::from_whole_fil(42).to_fil(), "42");
        assert_eq!(FilAmount::from_atto_u128(1).to_fil(), "0.000000000000000001");
    }

    #[test]
    fn test_from_fil_parses_decimal_strings() {
        let amount = FilAmount::from_fil(" 2.25 ").unwrap();
        assert_eq!(amount.to_atto(), U256::from(2_250_000_000_000_000_000u128));
    }

    #[test]
    fn test_from_fil_rejects_bad_input() {
        assert!(FilAmount::from_fil("").is_err());
        assert!(FilAmount::from_fil("-1").is_err());
        assert!(FilAmount::from_fil("abc").is_err());
    }

    #[test]
    fn test_times_applies_rate() {
        let ten = FilAmount::from_whole_fil(10);
        assert_eq!(ten.times(dec!(1.5)).to_fil(), "15");
        assert_eq!(ten.times(dec!(0.333)).to_fil(), "3.33");
        assert_eq!(ten.times(dec!(-2)), FilAmount::ZERO);
        assert_eq!(ten.times(Decimal::ZERO), FilAmount::ZERO);
    }

    #[test]
    fn test_to_decimal() {
        let amount = FilAmount::from_fil("3.1400").unwrap();
        assert_eq!(amount.to_decimal(), Some(dec!(3.14)));
        assert_eq!(FilAmount::from_atto(U256::MAX).to_decimal(), None);
    }

    #[test]
    fn test_plus_and_sum() {
        let total: FilAmount = ["1", "2.5", "0.5"]
            .iter()
            .map(|s| FilAmount::from_fil(s).unwrap())
            .sum();
        assert_eq!(total.to_fil(), "4");
        assert_eq!(
            FilAmount::from_whole_fil(1).saturating_minus(FilAmount::from_whole_fil(2)),
            FilAmount::ZERO
        );
    }

    #[test]
    fn test_serde_uses_fil_strings() {
        let amount = FilAmount::from_fil("0.75").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"0.75\"");
        let back: FilAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
