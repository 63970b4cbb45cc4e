//! Money calculation utilities using rust_decimal for precision
//!
//! Monetary values are stored and serialized as `f64` (currency
//! units); every calculation routes through `Decimal` and is rounded
//! back to 2 decimal places on the way out.

use super::error::OrderError;
use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: i64 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Validate a unit price (finite, non-negative, bounded)
pub fn validate_price(price: f64) -> Result<(), OrderError> {
    if !price.is_finite() {
        return Err(OrderError::InvalidOperation(format!(
            "price must be a finite number, got {price}"
        )));
    }
    if price < 0.0 {
        return Err(OrderError::InvalidOperation(format!(
            "price must be non-negative, got {price}"
        )));
    }
    if price > MAX_PRICE {
        return Err(OrderError::InvalidOperation(format!(
            "price exceeds maximum allowed ({MAX_PRICE}), got {price}"
        )));
    }
    Ok(())
}

/// Validate a line quantity
pub fn validate_quantity(quantity: i64) -> Result<(), OrderError> {
    if quantity < 1 {
        return Err(OrderError::InvalidOperation(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidOperation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}

/// Monetary equality within [`MONEY_TOLERANCE`]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() <= MONEY_TOLERANCE
}

/// Line total: unit price × quantity
pub fn line_total(price: f64, quantity: i64) -> f64 {
    to_f64(to_decimal(price) * Decimal::from(quantity))
}

/// Order total: sub_total - discount + shipping fee, floored at zero
pub fn order_total(sub_total: f64, discount_amount: f64, shipping_fee: f64) -> f64 {
    let total = to_decimal(sub_total) - to_decimal(discount_amount) + to_decimal(shipping_fee);
    to_f64(total.max(Decimal::ZERO))
}
