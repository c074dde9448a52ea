//! Display helpers shared by every view.

use alloy::primitives::Address;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

use super::money::{FilAmount, trim_fraction};

/// Decimal places shown for balances in tables and stats.
pub const FRIENDLY_DECIMALS: u32 = 6;

/// Symbol of the share token minted by pool `id`.
pub fn pool_token_symbol(pool_id: &str) -> String {
    format!("P{pool_id}GLIF")
}

/// Balance rounded down to `decimals` places.
///
/// With `abbreviate` set, values of a thousand and above collapse to
/// `K`/`M`/`B` with two decimals. Otherwise the integer part is grouped
/// with commas.
pub fn friendly_balance(amount: &FilAmount, decimals: u32, abbreviate: bool) -> String {
    let Some(value) = amount.to_decimal() else {
        // too large for Decimal; fall back to the exact string
        return amount.to_fil();
    };
    friendly_decimal(value, decimals, abbreviate)
}

/// Same as [`friendly_balance`] for plain decimals (rates, prices).
pub fn friendly_decimal(value: Decimal, decimals: u32, abbreviate: bool) -> String {
    if abbreviate {
        for (threshold, suffix) in [
            (Decimal::from(1_000_000_000u64), "B"),
            (Decimal::from(1_000_000u64), "M"),
            (Decimal::from(1_000u64), "K"),
        ] {
            if value.abs() >= threshold {
                let scaled = (value / threshold)
                    .round_dp_with_strategy(2, RoundingStrategy::ToZero);
                return format!("{}{suffix}", trim_fraction(&scaled.to_string()));
            }
        }
    }

    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::ToZero);
    let text = trim_fraction(&rounded.to_string());
    if abbreviate { text } else { group_thousands(&text) }
}

/// Interest rate as shown on pool pages: the FIL rendering of the raw rate
/// followed by a percent sign.
pub fn percent(rate: &FilAmount) -> String {
    format!("{}%", rate.to_fil())
}

/// `0x1234...abcd` form used in dense tables.
pub fn truncate_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Profit/loss cell: explicit `+` for gains, plain `-` for losses.
pub fn format_pnl(pnl: Decimal) -> String {
    let sign = if pnl > Decimal::ZERO { "+" } else { "" };
    format!("{sign}{} FIL", trim_fraction(&pnl.normalize().to_string()))
}

fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = text.strip_prefix('-').map_or(("", text), |rest| ("-", rest));
    let (int_part, frac_part) = unsigned.split_once('.').map_or((unsigned, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pool_token_symbol() {
        assert_eq!(pool_token_symbol("0"), "P0GLIF");
        assert_eq!(pool_token_symbol("12"), "P12GLIF");
    }

    #[test]
    fn test_friendly_balance_rounds_down() {
        let amount = FilAmount::from_fil("1234.5678919").unwrap();
        assert_eq!(friendly_balance(&amount, 6, false), "1,234.567891");
        assert_eq!(friendly_balance(&amount, 2, false), "1,234.56");
        assert_eq!(friendly_balance(&FilAmount::ZERO, 6, false), "0");
    }

    #[test]
    fn test_friendly_balance_abbreviates() {
        let amount = FilAmount::from_fil("2500000").unwrap();
        assert_eq!(friendly_balance(&amount, 6, true), "2.5M");
        let small = FilAmount::from_fil("999.1234567").unwrap();
        assert_eq!(friendly_balance(&small, 6, true), "999.123456");
        let thousands = FilAmount::from_fil("1999").unwrap();
        assert_eq!(friendly_balance(&thousands, 6, true), "1.99K");
    }

    #[test]
    fn test_percent_uses_fil_rendering() {
        let rate = FilAmount::from_atto_u128(12_500_000_000_000_000_000);
        assert_eq!(percent(&rate), "12.5%");
    }

    #[test]
    fn test_truncate_address() {
        let addr: Address = "0x00000000000000000000000000000000deadbeef".parse().unwrap();
        let short = truncate_address(&addr);
        assert!(short.starts_with("0x0000"));
        assert!(short.to_lowercase().ends_with("beef"));
        assert_eq!(short.len(), 13);
    }

    #[test]
    fn test_format_pnl_signs() {
        assert_eq!(format_pnl(dec!(1.50)), "+1.5 FIL");
        assert_eq!(format_pnl(dec!(-2)), "-2 FIL");
        assert_eq!(format_pnl(Decimal::ZERO), "0 FIL");
    }

    #[test]
    fn test_group_thousands_negative() {
        assert_eq!(group_thousands("-1234567.5"), "-1,234,567.5");
        assert_eq!(group_thousands("123"), "123");
    }
}
