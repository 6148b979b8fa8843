//! Rupee price formatting for storefront labels.

use rust_decimal::prelude::*;
use rusty_money::{iso, Formatter, Money, Params};

/// Amounts above this are assumed to be paise rather than rupees.
const PAISE_THRESHOLD: Decimal = Decimal::ONE_THOUSAND;

/// en-IN grouping: thousands, then lakhs, crores and beyond in pairs.
const INDIAN_GROUPING: &[usize] = &[3, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2];

/// Formats `amount` as whole rupees with Indian digit grouping, e.g. `₹1,23,457`.
///
/// Prices coming from the cart service are in paise, while hand-written
/// values are usually rupees. Anything above 1000 is treated as paise and
/// divided by 100 before rounding half away from zero.
pub fn format_inr(amount: Decimal) -> String {
    let rupees = if amount > PAISE_THRESHOLD {
        amount / Decimal::ONE_HUNDRED
    } else {
        amount
    };
    let rounded = rupees.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    Formatter::money(
        &Money::from_decimal(rounded, iso::INR),
        Params {
            separator_pattern: INDIAN_GROUPING,
            rounding: Some(0),
            symbol: Some(iso::INR.symbol),
            ..Params::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn small_amounts_are_rupees() {
        assert_eq!(format_inr(dec("0")), "₹0");
        assert_eq!(format_inr(dec("999")), "₹999");
        assert_eq!(format_inr(dec("1000")), "₹1,000");
    }

    #[test]
    fn large_amounts_are_paise() {
        assert_eq!(format_inr(dec("1001")), "₹10");
        assert_eq!(format_inr(dec("249900")), "₹2,499");
        assert_eq!(format_inr(dec("1234567800")), "₹1,23,45,678");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_inr(dec("12.5")), "₹13");
        assert_eq!(format_inr(dec("12.49")), "₹12");
        assert_eq!(format_inr(dec("-12.5")), "-₹13");
        assert_eq!(format_inr(dec("-0.4")), "₹0");
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(format_inr(dec("123456")), "₹1,235");
        assert_eq!(format_inr(dec("12345600")), "₹1,23,456");
        assert_eq!(format_inr(dec("123456789000")), "₹1,23,45,67,890");
    }
}
