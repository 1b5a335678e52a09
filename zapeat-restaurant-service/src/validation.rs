use std::str::FromStr;

use bigdecimal::{num_bigint::Sign, BigDecimal, Zero};
use zapeat_proto::common::Money;

use crate::error::FieldViolation;

pub fn required_text(field: &str, value: &str) -> Option<FieldViolation> {
    value
        .trim()
        .is_empty()
        .then(|| FieldViolation::new(field, "This field may not be blank"))
}

/// Accepts an optional `+`, an optional leading `1` and 9 to 15 digits.
pub fn is_valid_mobile_number(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match digits.len() {
        9..=15 => true,
        16 => digits.starts_with('1'),
        _ => false,
    }
}

pub fn validate_restaurant(name: &str, mobile_number: &str, email: &str) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = required_text("name", name).into_iter().collect();
    if !is_valid_mobile_number(mobile_number) {
        violations.push(FieldViolation::new(
            "mobile_number",
            "Mobile number must be entered in the format '+999999999'. Up to 15 digits allowed.",
        ));
    }
    if !email.contains('@') {
        violations.push(FieldViolation::new("email", "Enter a valid email address"));
    }
    violations
}

const MAX_AMOUNT_LEN: usize = 32;
const PRICE_DECIMAL_PLACES: i64 = 2;
const PRICE_INTEGER_DIGITS: i64 = 8;

/// Prices fit `NUMERIC(10, 2)`: non-negative, at most 8 digits before the
/// point and 2 after. Nothing is rescaled until the bounds hold, so an
/// input like `1e2000000` is rejected without being expanded.
pub fn parse_price(field: &str, money: Option<&Money>) -> Result<BigDecimal, FieldViolation> {
    let amount = money
        .map(|m| m.amount.trim())
        .filter(|a| !a.is_empty())
        .ok_or_else(|| FieldViolation::new(field, "Price is required"))?;
    if amount.len() > MAX_AMOUNT_LEN {
        return Err(FieldViolation::new(
            field,
            "Ensure that there are no more than 10 digits in total",
        ));
    }
    let price = BigDecimal::from_str(amount)
        .map_err(|_| FieldViolation::new(field, "Price must be a decimal number"))?;

    let (digits, scale) = price.as_bigint_and_scale();
    if digits.is_zero() {
        return Ok(BigDecimal::zero().with_scale(PRICE_DECIMAL_PLACES));
    }
    if digits.sign() == Sign::Minus {
        return Err(FieldViolation::new(field, "Price must not be negative"));
    }
    let significant = digits.to_string();
    let trailing_zeros = significant.bytes().rev().take_while(|&b| b == b'0').count() as i64;
    if scale.saturating_sub(trailing_zeros) > PRICE_DECIMAL_PLACES {
        return Err(FieldViolation::new(
            field,
            "Ensure that there are no more than 2 decimal places",
        ));
    }
    if (significant.len() as i64).saturating_sub(scale) > PRICE_INTEGER_DIGITS {
        return Err(FieldViolation::new(
            field,
            "Ensure that there are no more than 8 digits before the decimal point",
        ));
    }
    Ok(price.with_scale(PRICE_DECIMAL_PLACES))
}

pub fn validate_group_bounds(min_options: i32, max_options: i32) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if min_options < 0 {
        violations.push(FieldViolation::new(
            "min_options_allowed",
            "Minimum options must not be negative",
        ));
    }
    if max_options < 1 {
        violations.push(FieldViolation::new(
            "max_options_allowed",
            "Maximum options must be at least 1",
        ));
    } else if min_options > max_options {
        violations.push(FieldViolation::new(
            "min_options_allowed",
            "Minimum options cannot be greater than maximum options",
        ));
    }
    violations
}
