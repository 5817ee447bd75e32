// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Exact conversion between base units and human-readable decimal units
//!
//! Amounts are held as [`U256`] and converted with integer division only, so a
//! rendered balance never picks up floating-point rounding.

use alloy_primitives::U256;

/// Decimals between wei and ether
pub const ETHER_DECIMALS: u8 = 18;
/// Decimals between wei and gwei
pub const GWEI_DECIMALS: u8 = 9;
/// Decimals between satoshi and bitcoin
pub const BITCOIN_DECIMALS: u8 = 8;

/// Errors produced when reading amounts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// Input is not a non-negative decimal number
    #[error("invalid decimal amount: {0:?}")]
    InvalidAmount(String),

    /// Input is not a valid hexadecimal quantity
    #[error("invalid hex quantity: {0:?}")]
    InvalidQuantity(String),

    /// Result does not fit in 256 bits
    #[error("amount {0:?} overflows 256 bits")]
    Overflow(String),
}

/// Returns `10^decimals`, or `None` once it no longer fits in a `U256`
fn scale(decimals: u8) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(decimals))
}

/// Renders a base-unit amount in human units
///
/// Trailing zeros of the fractional part are dropped and the decimal point
/// is omitted entirely when the amount is a whole number.
pub fn to_human_unit(amount: U256, decimals: u8) -> String {
    let (integer, remainder) = match scale(decimals) {
        Some(scale) => (amount / scale, amount % scale),
        // 10^decimals exceeds every representable amount
        None => (U256::ZERO, amount),
    };

    if remainder.is_zero() {
        return integer.to_string();
    }

    let padded = format!("{:0>width$}", remainder.to_string(), width = usize::from(decimals));
    let fraction = padded.trim_end_matches('0');
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{integer}.{fraction}")
    }
}

/// Reads a human-unit decimal string back into base units
///
/// Fractional digits beyond `decimals` are truncated.
pub fn to_base_unit(amount: &str, decimals: u8) -> Result<U256, UnitError> {
    let invalid = || UnitError::InvalidAmount(amount.to_string());
    let overflow = || UnitError::Overflow(amount.to_string());

    let trimmed = amount.trim();
    let (integer, fraction) = match trimmed.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (trimmed, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !all_digits(integer) || !all_digits(fraction)
    {
        return Err(invalid());
    }

    let digits = usize::from(decimals);
    let mut fraction: String = fraction.chars().take(digits).collect();
    while fraction.len() < digits {
        fraction.push('0');
    }

    let parse = |s: &str| -> Result<U256, UnitError> {
        if s.is_empty() {
            Ok(U256::ZERO)
        } else {
            U256::from_str_radix(s, 10).map_err(|_| overflow())
        }
    };

    let integer = parse(integer)?;
    let fraction = parse(&fraction)?;

    if integer.is_zero() {
        return Ok(fraction);
    }

    scale(decimals)
        .and_then(|scale| integer.checked_mul(scale))
        .and_then(|whole| whole.checked_add(fraction))
        .ok_or_else(overflow)
}

/// Decodes a JSON-RPC hex quantity such as `0x1bc16d674ec80000`
pub fn parse_quantity(quantity: &str) -> Result<U256, UnitError> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))
        .ok_or_else(|| UnitError::InvalidQuantity(quantity.to_string()))?;

    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 16).map_err(|_| UnitError::InvalidQuantity(quantity.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(s: &str) -> U256 {
        U256::from_str_radix(s, 10).unwrap()
    }

    #[test]
    fn whole_units_have_no_decimal_point() {
        assert_eq!(to_human_unit(U256::ZERO, ETHER_DECIMALS), "0");
        assert_eq!(to_human_unit(wei("1000000000000000000"), ETHER_DECIMALS), "1");
        assert_eq!(to_human_unit(U256::from(100_000_000u64), BITCOIN_DECIMALS), "1");
        assert_eq!(to_human_unit(U256::from(4_200_000_000u64), BITCOIN_DECIMALS), "42");
    }

    #[test]
    fn fractional_units_strip_trailing_zeros() {
        assert_eq!(to_human_unit(wei("1500000000000000000"), ETHER_DECIMALS), "1.5");
        assert_eq!(to_human_unit(U256::from(1u8), ETHER_DECIMALS), "0.000000000000000001");
        assert_eq!(to_human_unit(U256::from(12_345u64), BITCOIN_DECIMALS), "0.00012345");
        assert_eq!(to_human_unit(U256::from(25_000_000_000u64), GWEI_DECIMALS), "25");
        assert_eq!(to_human_unit(U256::from(1_500_000_001u64), GWEI_DECIMALS), "1.500000001");
    }

    #[test]
    fn zero_decimals() {
        assert_eq!(to_human_unit(U256::from(77u8), 0), "77");
        assert_eq!(to_base_unit("77", 0).unwrap(), U256::from(77u8));
        assert_eq!(to_base_unit("77.9", 0).unwrap(), U256::from(77u8));
    }

    #[test]
    fn decimals_beyond_u256_range() {
        assert_eq!(to_human_unit(U256::from(5u8), 80), format!("0.{}5", "0".repeat(79)));
        assert_eq!(to_human_unit(U256::MAX, 255).len(), 257);
    }

    #[test]
    fn max_value_renders_exactly() {
        let rendered = to_human_unit(U256::MAX, ETHER_DECIMALS);
        assert_eq!(to_base_unit(&rendered, ETHER_DECIMALS).unwrap(), U256::MAX);
    }

    #[test]
    fn base_unit_parsing() {
        assert_eq!(to_base_unit("1.5", ETHER_DECIMALS).unwrap(), wei("1500000000000000000"));
        assert_eq!(to_base_unit("0.00012345", BITCOIN_DECIMALS).unwrap(), U256::from(12_345u64));
        assert_eq!(to_base_unit(".5", 1).unwrap(), U256::from(5u8));
        assert_eq!(to_base_unit("3.", 2).unwrap(), U256::from(300u16));
        // digits past the precision are dropped
        assert_eq!(to_base_unit("0.123456789", BITCOIN_DECIMALS).unwrap(), U256::from(12_345_678u64));
    }

    #[test]
    fn base_unit_rejects_garbage() {
        for input in ["", ".", "-1", "1e18", "1.2.3", "abc", "+5", "1,5"] {
            assert!(
                matches!(to_base_unit(input, ETHER_DECIMALS), Err(UnitError::InvalidAmount(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn base_unit_overflow() {
        let huge = format!("{}", U256::MAX);
        assert!(matches!(
            to_base_unit(&huge, ETHER_DECIMALS),
            Err(UnitError::Overflow(_))
        ));
    }

    #[test]
    fn round_trip_for_bitcoin_and_ether_precisions() {
        let samples = [
            U256::ZERO,
            U256::from(1u8),
            U256::from(10u8),
            U256::from(99_999_999u64),
            U256::from(100_000_000u64),
            U256::from(2_100_000_000_000_000u64),
            wei("1000000000000000000"),
            wei("1234567890123456789012345678901234567890"),
            U256::MAX,
        ];
        for decimals in [BITCOIN_DECIMALS, ETHER_DECIMALS] {
            for amount in samples {
                let human = to_human_unit(amount, decimals);
                assert_eq!(
                    to_base_unit(&human, decimals).unwrap(),
                    amount,
                    "round trip failed for {amount} at {decimals} decimals"
                );
            }
        }
    }

    #[test]
    fn hex_quantities() {
        assert_eq!(parse_quantity("0x0").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity("0x").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity("0x1bc16d674ec80000").unwrap(), wei("2000000000000000000"));
        assert_eq!(parse_quantity("0X12").unwrap(), U256::from(18u8));
        assert!(parse_quantity("12").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }
}
