//! Money calculation utilities using rust_decimal for precision
//!
//! Prices carry at most two decimal places, so line and order totals are
//! exact sums and never need rounding. Rounding only appears when a bill is
//! divided.

use crate::error::{ManagerError, ManagerResult};
use rust_decimal::prelude::*;
use shared::models::OrderLine;

/// Decimal places of the currency unit
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price per item
const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Maximum allowed quantity per item
pub const MAX_QUANTITY: u32 = 9999;

fn has_sub_cent_digits(value: Decimal) -> bool {
    value.normalize().scale() > DECIMAL_PLACES
}

/// Validate one order line before it is priced
pub fn validate_line(index: usize, line: &OrderLine) -> ManagerResult<()> {
    if line.name.trim().is_empty() {
        return Err(ManagerError::Validation(format!(
            "line {index}: name must not be empty"
        )));
    }
    if line.unit_price.is_sign_negative() {
        return Err(ManagerError::Validation(format!(
            "line {index}: unit_price must be non-negative, got {}",
            line.unit_price
        )));
    }
    if line.unit_price > MAX_PRICE {
        return Err(ManagerError::Validation(format!(
            "line {index}: unit_price exceeds maximum allowed ({MAX_PRICE})"
        )));
    }
    if has_sub_cent_digits(line.unit_price) {
        return Err(ManagerError::Validation(format!(
            "line {index}: unit_price has more than {DECIMAL_PLACES} decimal places"
        )));
    }
    if line.quantity == 0 || line.quantity > MAX_QUANTITY {
        return Err(ManagerError::Validation(format!(
            "line {index}: quantity must be between 1 and {MAX_QUANTITY}, got {}",
            line.quantity
        )));
    }
    for modifier in &line.modifiers {
        if modifier.price.abs() > MAX_PRICE || has_sub_cent_digits(modifier.price) {
            return Err(ManagerError::Validation(format!(
                "line {index}: modifier '{}' has an invalid price {}",
                modifier.name, modifier.price
            )));
        }
    }
    if unit_total(line).is_sign_negative() {
        return Err(ManagerError::Validation(format!(
            "line {index}: modifiers reduce the price below zero"
        )));
    }
    Ok(())
}

/// Unit price plus every modifier delta
pub fn unit_total(line: &OrderLine) -> Decimal {
    line.modifiers
        .iter()
        .fold(line.unit_price, |acc, m| acc + m.price)
}

/// Extended price of a line: (unit price + modifiers) × quantity
pub fn line_total(line: &OrderLine) -> Decimal {
    unit_total(line) * Decimal::from(line.quantity)
}

/// Sum of every line's extended price
pub fn order_total(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(line_total).sum()
}

/// Two amounts are equal within [`MONEY_TOLERANCE`]
pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}

/// Round to currency precision (half away from zero)
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Divide `amount` into `ways` cent-exact shares whose sum is `amount`.
///
/// Leftover cents go to the first shares: 10.00 / 3 → 3.34, 3.33, 3.33.
pub fn split_evenly(amount: Decimal, ways: u32) -> Vec<Decimal> {
    if ways == 0 {
        return Vec::new();
    }
    let cents = (round_money(amount) * Decimal::ONE_HUNDRED)
        .to_i64()
        .unwrap_or(0);
    let ways_i = i64::from(ways);
    let base = cents / ways_i;
    let remainder = cents % ways_i;
    (0..ways_i)
        .map(|i| Decimal::new(base + i64::from(i < remainder), DECIMAL_PLACES))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Modifier;

    fn line(name: &str, price: Decimal, quantity: u32) -> OrderLine {
        OrderLine {
            name: name.to_string(),
            unit_price: price,
            quantity,
            category: "main".to_string(),
            modifiers: vec![],
            seat_number: None,
        }
    }

    #[test]
    fn test_line_total_with_modifiers() {
        let mut l = line("Latte", Decimal::new(350, 2), 2);
        l.modifiers.push(Modifier {
            name: "Oat milk".to_string(),
            price: Decimal::new(50, 2),
        });
        l.modifiers.push(Modifier {
            name: "No foam".to_string(),
            price: Decimal::ZERO,
        });
        assert_eq!(line_total(&l), Decimal::new(800, 2));
    }

    #[test]
    fn test_order_total() {
        let lines = vec![
            line("Burger", Decimal::new(1299, 2), 1),
            line("Fries", Decimal::new(499, 2), 1),
            line("Cola", Decimal::new(299, 2), 1),
        ];
        assert_eq!(order_total(&lines), Decimal::new(2097, 2));
    }

    #[test]
    fn test_money_eq_tolerance() {
        assert!(money_eq(Decimal::new(2097, 2), Decimal::new(20970, 3)));
        assert!(money_eq(Decimal::new(20975, 3), Decimal::new(2097, 2)));
        assert!(!money_eq(Decimal::new(2098, 2), Decimal::new(2097, 2)));
    }

    #[test]
    fn test_split_evenly_distributes_remainder() {
        let parts = split_evenly(Decimal::new(1000, 2), 3);
        assert_eq!(
            parts,
            vec![Decimal::new(334, 2), Decimal::new(333, 2), Decimal::new(333, 2)]
        );
        assert_eq!(parts.iter().copied().sum::<Decimal>(), Decimal::new(1000, 2));

        let parts = split_evenly(Decimal::new(2097, 2), 4);
        assert_eq!(parts.iter().copied().sum::<Decimal>(), Decimal::new(2097, 2));
        assert_eq!(parts[0], Decimal::new(525, 2));
        assert_eq!(parts[3], Decimal::new(524, 2));
    }

    #[test]
    fn test_split_evenly_zero_ways() {
        assert!(split_evenly(Decimal::new(100, 2), 0).is_empty());
    }

    #[test]
    fn test_validate_line_rejects_bad_input() {
        assert!(validate_line(0, &line("Soup", Decimal::new(450, 2), 1)).is_ok());
        assert!(validate_line(0, &line("", Decimal::new(450, 2), 1)).is_err());
        assert!(validate_line(0, &line("Soup", Decimal::new(-1, 0), 1)).is_err());
        assert!(validate_line(0, &line("Soup", Decimal::new(4501, 3), 1)).is_err());
        assert!(validate_line(0, &line("Soup", Decimal::new(450, 2), 0)).is_err());
        assert!(validate_line(0, &line("Soup", Decimal::new(450, 2), MAX_QUANTITY + 1)).is_err());
        // trailing zeros are fine
        assert!(validate_line(0, &line("Soup", Decimal::new(4500, 3), 1)).is_ok());
    }

    #[test]
    fn test_validate_line_negative_after_modifiers() {
        let mut l = line("Salad", Decimal::new(300, 2), 1);
        l.modifiers.push(Modifier {
            name: "Voucher".to_string(),
            price: Decimal::new(-500, 2),
        });
        assert!(validate_line(0, &l).is_err());
    }
}
