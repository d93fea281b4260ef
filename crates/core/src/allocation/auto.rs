//! Automatic distribution of a shared cost across shipment items.
//!
//! Weighted methods use the Largest Remainder Method:
//! 1. Calculate each item's exact share
//! 2. Round every share down to the cent
//! 3. Calculate the remainder (amount - sum of rounded shares)
//! 4. Hand out the remaining cents to the largest fractional parts
//!
//! The equal method rounds every share down and lets the last item absorb
//! whatever is left, so at most one item differs from `amount / n`.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

use super::method::CalculationMethod;
use crate::error::LandedCostError;
use crate::money::{self, CURRENCY_DECIMAL_PLACES};

/// The per-item quantities an allocation method can key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationBasis {
    /// `quantity * unit_cost`.
    pub base_cost: Decimal,
    /// Item weight; missing weights count as zero.
    pub weight: Decimal,
    /// Item quantity.
    pub quantity: Decimal,
}

/// Allocation utility for distributing shared costs.
pub struct AllocationUtil;

impl AllocationUtil {
    /// Distributes `amount` across `items` using `method`.
    ///
    /// Shares are kept to the cent, or to the amount's own precision when it
    /// carries more digits, so they always sum to `amount` exactly for any
    /// non-degenerate item set. When the method's total basis is zero (no
    /// base cost, no weight) every item receives zero.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if an intermediate product overflows.
    pub fn allocate(
        amount: Decimal,
        items: &[AllocationBasis],
        method: CalculationMethod,
    ) -> Result<Vec<Decimal>, LandedCostError> {
        let decimal_places = CURRENCY_DECIMAL_PLACES.max(amount.normalize().scale());

        match method {
            CalculationMethod::Equal => {
                Ok(Self::allocate_equal(amount, items.len(), decimal_places))
            }
            CalculationMethod::Proportional => {
                let weights: Vec<Decimal> = items.iter().map(|i| i.base_cost).collect();
                Self::allocate_by_weights(amount, &weights, decimal_places)
            }
            CalculationMethod::WeightBased => {
                let weights: Vec<Decimal> = items.iter().map(|i| i.weight).collect();
                Self::allocate_by_weights(amount, &weights, decimal_places)
            }
            CalculationMethod::QuantityBased => {
                let weights: Vec<Decimal> = items.iter().map(|i| i.quantity).collect();
                Self::allocate_by_weights(amount, &weights, decimal_places)
            }
        }
    }

    /// Allocates `total` equally across `count` recipients.
    ///
    /// Every recipient but the last receives `total / count` rounded down;
    /// the last one takes the remainder so the sum equals the rounded total.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use landed_core::allocation::AllocationUtil;
    ///
    /// // 100 / 3 = [33.33, 33.33, 33.34], sum = 100.00
    /// let result = AllocationUtil::allocate_equal(dec!(100), 3, 2);
    /// assert_eq!(result, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
    /// ```
    #[must_use]
    pub fn allocate_equal(total: Decimal, count: usize, decimal_places: u32) -> Vec<Decimal> {
        if count == 0 {
            return vec![];
        }

        let total_rounded =
            total.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven);
        if count == 1 {
            return vec![total_rounded];
        }

        let count_dec = Decimal::from(count as u64);
        let base = money::floor_to(total_rounded / count_dec, decimal_places);
        let last = total_rounded - base * Decimal::from((count - 1) as u64);

        let mut shares = vec![base; count];
        shares[count - 1] = last;
        shares
    }

    /// Allocates `total` in proportion to `weights`.
    ///
    /// Ensures the sum of allocations equals the rounded total whenever the
    /// weights sum to something positive. Zero total weight yields all zeros.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use landed_core::allocation::AllocationUtil;
    ///
    /// let result = AllocationUtil::allocate_by_weights(dec!(100), &[dec!(1), dec!(1), dec!(1)], 2)
    ///     .unwrap();
    /// assert_eq!(result, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if an intermediate product overflows.
    pub fn allocate_by_weights(
        total: Decimal,
        weights: &[Decimal],
        decimal_places: u32,
    ) -> Result<Vec<Decimal>, LandedCostError> {
        if weights.is_empty() {
            return Ok(vec![]);
        }

        let total_weight = money::sum(weights.iter().copied())?;
        if total_weight <= Decimal::ZERO {
            return Ok(vec![Decimal::ZERO; weights.len()]);
        }

        let unit = Decimal::new(1, decimal_places);
        let total_rounded =
            total.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven);

        // Exact shares, ratio first: `total * weight` alone can leave the Decimal range.
        let exact = weights
            .iter()
            .map(|w| {
                let ratio = money::divide(*w, total_weight, "allocation share")?;
                money::multiply(total_rounded, ratio)
            })
            .collect::<Result<Vec<Decimal>, _>>()?;

        // Round down each
        let mut rounded: Vec<Decimal> = exact
            .iter()
            .map(|a| money::floor_to(*a, decimal_places))
            .collect();

        let sum_rounded: Decimal = rounded.iter().copied().sum();
        let remainder = money::subtract(total_rounded, sum_rounded)?;

        let units_to_distribute = (remainder / unit)
            .round_dp_with_strategy(0, RoundingStrategy::ToZero)
            .to_u64()
            .unwrap_or(0);
        let units_to_distribute = usize::try_from(units_to_distribute).unwrap_or(0);

        if units_to_distribute == 0 {
            return Ok(rounded);
        }

        let mut remainders: Vec<(usize, Decimal)> = exact
            .iter()
            .zip(rounded.iter())
            .enumerate()
            .map(|(i, (e, r))| (i, *e - *r))
            .collect();

        // Largest fractional part first; stable sort keeps lower indexes ahead on ties.
        remainders.sort_by(|a, b| b.1.cmp(&a.1));

        for (idx, _) in remainders.iter().take(units_to_distribute) {
            rounded[*idx] += unit;
        }

        Ok(rounded)
    }
}
