//! Amount conversions
//!
//! All decision arithmetic happens on integer base units. `Decimal` is only used
//! to render amounts for humans once a decision has been made.

use alloy::primitives::{I256, U256};
use rust_decimal::Decimal;

/// Whole tokens → smallest unit (e.g. 10 WETH → 10 * 10^18)
pub fn to_base_units(whole_tokens: u64, decimals: u8) -> U256 {
    U256::from(whole_tokens).saturating_mul(U256::from(10u64).pow(U256::from(decimals)))
}

/// Render a base-unit amount as tokens. Falls back to the raw integer when the
/// value does not fit a Decimal.
pub fn format_units(amount: U256, decimals: u8) -> String {
    match i128::try_from(amount) {
        Ok(raw) => format_i128(raw, decimals),
        Err(_) => amount.to_string(),
    }
}

/// Signed variant of [`format_units`] (net profit can be negative)
pub fn format_signed_units(amount: I256, decimals: u8) -> String {
    match i128::try_from(amount) {
        Ok(raw) => format_i128(raw, decimals),
        Err(_) => amount.to_string(),
    }
}

fn format_i128(raw: i128, decimals: u8) -> String {
    match Decimal::try_from_i128_with_scale(raw, decimals as u32) {
        Ok(d) => d.normalize().to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_base_units() {
        assert_eq!(
            to_base_units(10, 18),
            U256::from(10_000_000_000_000_000_000u128)
        );
        assert_eq!(to_base_units(10, 6), U256::from(10_000_000u64));
        assert_eq!(to_base_units(0, 18), U256::ZERO);
    }

    #[test]
    fn test_format_units() {
        let one_and_half = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_units(one_and_half, 18), dec!(1.5).to_string());
        assert_eq!(format_units(U256::from(2_500_000u64), 6), "2.5");
        assert_eq!(format_units(U256::ZERO, 18), "0");
    }

    #[test]
    fn test_format_signed_units() {
        let loss = I256::try_from(-100_000_000_000_000_000i128).unwrap();
        assert_eq!(format_signed_units(loss, 18), "-0.1");
    }

    #[test]
    fn test_format_units_overflow_falls_back_to_raw() {
        assert_eq!(format_units(U256::MAX, 18), U256::MAX.to_string());
    }
}
