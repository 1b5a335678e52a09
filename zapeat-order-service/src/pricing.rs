//! Order pricing.
//!
//! A line costs `base_price * quantity`, plus `option_price * quantity` when a
//! customization option is chosen. The order total is the sum of its lines.
//! Everything is exact decimal arithmetic.

use bigdecimal::{num_bigint::BigInt, BigDecimal, Zero};

pub const MAX_QUANTITY: i32 = 1_000;

/// Amounts are stored as `NUMERIC(10, 2)`.
pub fn max_amount() -> BigDecimal {
    BigDecimal::new(BigInt::from(9_999_999_999_i64), 2)
}

pub fn fits_amount(amount: &BigDecimal) -> bool {
    *amount <= max_amount()
}

pub fn line_price(base_price: &BigDecimal, option_price: Option<&BigDecimal>, quantity: i32) -> BigDecimal {
    let quantity = BigDecimal::from(quantity);
    let customization = option_price
        .map(|price| price * &quantity)
        .unwrap_or_else(BigDecimal::zero);
    base_price * &quantity + customization
}

pub fn order_total<'a>(line_prices: impl IntoIterator<Item = &'a BigDecimal>) -> BigDecimal {
    line_prices.into_iter().cloned().sum::<BigDecimal>()
}
