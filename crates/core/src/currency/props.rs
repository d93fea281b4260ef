//! Property-based tests for the USD projection.
//!
//! - Rounding: results carry at most 4 decimal places
//! - Reversibility: `to_usd(x, r) * r == x` within half a rounding unit
//! - Identity for USD shipments

use proptest::prelude::*;
use rust_decimal::Decimal;

use landed_shared::types::CurrencyCode;

use super::projection::{from_usd, to_usd};

/// Strategy to generate amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn non_usd_currency() -> impl Strategy<Value = CurrencyCode> {
    prop_oneof![Just("MVR"), Just("IDR"), Just("EUR"), Just("JPY")]
        .prop_map(|code| CurrencyCode::parse(code).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* amount and rate, the projection SHALL have at most 4 decimal places.
    #[test]
    fn prop_projection_rounds_to_4_decimals(
        amount in positive_amount(),
        rate in positive_rate(),
        currency in non_usd_currency(),
    ) {
        let result = to_usd(amount, &currency, rate).unwrap();
        let scaled = result * Decimal::from(10000);
        prop_assert_eq!(scaled, scaled.round(), "{} has more than 4 decimals", result);
    }

    /// *For any* amount and rate, projecting to USD and back SHALL recover the
    /// amount within the rounding error amplified by the rate.
    #[test]
    fn prop_projection_is_reversible(
        amount in positive_amount(),
        rate in positive_rate(),
        currency in non_usd_currency(),
    ) {
        let usd = to_usd(amount, &currency, rate).unwrap();
        let back = usd * rate;
        let tolerance = rate * Decimal::new(5, 5);
        prop_assert!(
            (back - amount).abs() <= tolerance,
            "{} -> {} -> {} exceeds tolerance {}",
            amount, usd, back, tolerance
        );
    }

    /// *For any* amount, a USD base currency SHALL project to itself.
    #[test]
    fn prop_usd_projection_is_identity(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let usd = CurrencyCode::usd();
        prop_assert_eq!(to_usd(amount, &usd, rate).unwrap(), amount);
        prop_assert_eq!(from_usd(amount, &usd, rate).unwrap(), amount);
    }

    /// *For any* input, projecting twice from the same stored value SHALL give
    /// the same answer.
    #[test]
    fn prop_projection_is_deterministic(
        amount in positive_amount(),
        rate in positive_rate(),
        currency in non_usd_currency(),
    ) {
        prop_assert_eq!(
            to_usd(amount, &currency, rate).unwrap(),
            to_usd(amount, &currency, rate).unwrap()
        );
    }
}
