//! USD projection of base-currency amounts.
//!
//! CRITICAL: projection is presentation-only. Stored landed costs stay in the
//! shipment's base currency; these helpers return new values and never
//! rewrite a `CalculationResult`.
//!
//! Rates are quoted as base-currency units per 1 USD, so converting to USD
//! divides by the rate. Results use banker's rounding at 4 decimal places.

use rust_decimal::Decimal;

use crate::error::LandedCostError;
use crate::money;
use landed_shared::types::CurrencyCode;

/// Rejects non-positive exchange rates.
///
/// # Errors
///
/// Returns `InvalidExchangeRate` if `rate <= 0`.
pub fn ensure_valid_rate(rate: Decimal) -> Result<(), LandedCostError> {
    if rate <= Decimal::ZERO {
        return Err(LandedCostError::InvalidExchangeRate(rate));
    }
    Ok(())
}

/// Converts a base-currency amount to USD.
///
/// Identity when the base currency is USD; otherwise `amount / rate`.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use landed_core::currency::to_usd;
/// use landed_shared::types::CurrencyCode;
///
/// let mvr = CurrencyCode::parse("MVR").unwrap();
/// assert_eq!(to_usd(dec!(154.20), &mvr, dec!(15.42)).unwrap(), dec!(10));
/// ```
///
/// # Errors
///
/// Returns `InvalidExchangeRate` if `rate <= 0`, even for USD.
pub fn to_usd(
    amount: Decimal,
    base_currency: &CurrencyCode,
    rate: Decimal,
) -> Result<Decimal, LandedCostError> {
    ensure_valid_rate(rate)?;
    if base_currency.is_usd() {
        return Ok(amount);
    }
    Ok(money::round_rate(money::divide(amount, rate, "USD projection")?))
}

/// Converts a USD amount back to the base currency.
///
/// # Errors
///
/// Returns `InvalidExchangeRate` if `rate <= 0`.
pub fn from_usd(
    amount: Decimal,
    base_currency: &CurrencyCode,
    rate: Decimal,
) -> Result<Decimal, LandedCostError> {
    ensure_valid_rate(rate)?;
    if base_currency.is_usd() {
        return Ok(amount);
    }
    Ok(money::round_rate(money::multiply(amount, rate)?))
}
