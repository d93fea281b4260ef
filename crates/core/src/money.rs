//! Fixed-point decimal helpers for currency amounts.
//!
//! CRITICAL: no floating point. Every amount, rate and share is a
//! `rust_decimal::Decimal`; rounding always uses banker's rounding
//! (`MidpointNearestEven`) so repeated rounding does not drift.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

use crate::error::LandedCostError;

/// Fractional digits kept for currency amounts.
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

/// Fractional digits kept for rates, shares and per-unit costs.
pub const RATE_DECIMAL_PLACES: u32 = 4;

/// Default tolerance for balance checks: one cent of the base currency.
pub const DEFAULT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Checked addition.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the sum does not fit in a `Decimal`.
pub fn add(a: Decimal, b: Decimal) -> Result<Decimal, LandedCostError> {
    a.checked_add(b)
        .ok_or(LandedCostError::ArithmeticOverflow { context: "sum" })
}

/// Checked subtraction.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the difference does not fit in a `Decimal`.
pub fn subtract(a: Decimal, b: Decimal) -> Result<Decimal, LandedCostError> {
    a.checked_sub(b)
        .ok_or(LandedCostError::ArithmeticOverflow { context: "difference" })
}

/// Checked multiplication.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the product does not fit in a `Decimal`.
pub fn multiply(a: Decimal, b: Decimal) -> Result<Decimal, LandedCostError> {
    a.checked_mul(b)
        .ok_or(LandedCostError::ArithmeticOverflow { context: "product" })
}

/// Checked division.
///
/// Callers guard against zero totals themselves (a zero total weight is a
/// legitimate degenerate case, not an error); reaching this with `b == 0`
/// means an upstream invariant was broken.
///
/// # Errors
///
/// Returns `DivisionByZero` tagged with `context` when `b` is zero, and
/// `ArithmeticOverflow` when the quotient does not fit.
pub fn divide(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal, LandedCostError> {
    if b.is_zero() {
        return Err(LandedCostError::DivisionByZero { context });
    }
    a.checked_div(b)
        .ok_or(LandedCostError::ArithmeticOverflow { context })
}

/// Returns true if `a` and `b` differ by no more than `epsilon`.
#[must_use]
pub fn nearly_equal(a: Decimal, b: Decimal, epsilon: Decimal) -> bool {
    (a - b).abs() <= epsilon
}

/// Sums a sequence of amounts with overflow checking.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if any partial sum overflows.
pub fn sum<I>(values: I) -> Result<Decimal, LandedCostError>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, add)
}

/// Rounds to rate precision with banker's rounding.
#[must_use]
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}

/// Truncates toward zero at the given precision.
#[must_use]
pub fn floor_to(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::ToZero)
}
