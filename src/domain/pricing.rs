//! Pricing calculator: pure functions over decimal amounts.
//!
//! All monetary values are non-negative and nothing here ever produces a
//! negative result.

use rust_decimal::Decimal;

/// Subtotal for a single line: quantity times unit price.
pub fn line_subtotal(quantity: i32, unit_price: Decimal) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Total across (quantity, unit price) pairs.
pub fn order_total<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    lines
        .into_iter()
        .map(|(quantity, price)| line_subtotal(quantity, price))
        .sum()
}

/// Flat discount subtraction, floored at zero.
pub fn discounted_total(total: Decimal, discount: Decimal) -> Decimal {
    (total - discount).max(Decimal::ZERO)
}
