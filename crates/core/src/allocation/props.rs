//! Property-based tests for allocation strategies.
//!
//! - Sum invariant for every method
//! - Equal split: at most one item deviates from `amount / n`
//! - Degenerate bases allocate nothing
//! - Manual override balance rule

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::auto::{AllocationBasis, AllocationUtil};
use super::manual::resolve_allocation;
use super::method::CalculationMethod;
use crate::catalog::ExpenseCategory;
use crate::error::LandedCostError;
use crate::money::{self, CURRENCY_DECIMAL_PLACES, DEFAULT_EPSILON};
use landed_shared::types::ExpenseCategoryId;

/// Strategy to generate shared cost amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate one item's allocation basis with strictly positive fields.
fn item_basis() -> impl Strategy<Value = AllocationBasis> {
    (1i64..10_000_000i64, 1i64..100_000i64, 1i64..10_000i64).prop_map(
        |(base_cents, weight_grams, quantity)| AllocationBasis {
            base_cost: Decimal::new(base_cents, 2),
            weight: Decimal::new(weight_grams, 3),
            quantity: Decimal::from(quantity),
        },
    )
}

/// Strategy to generate 1-20 items.
fn item_bases() -> impl Strategy<Value = Vec<AllocationBasis>> {
    prop::collection::vec(item_basis(), 1..20)
}

fn method_strategy() -> impl Strategy<Value = CalculationMethod> {
    prop_oneof![
        Just(CalculationMethod::Proportional),
        Just(CalculationMethod::Equal),
        Just(CalculationMethod::WeightBased),
        Just(CalculationMethod::QuantityBased),
    ]
}

fn overridable_category() -> ExpenseCategory {
    ExpenseCategory {
        id: ExpenseCategoryId::new(1),
        name: "Customs Duty".into(),
        description: None,
        allows_item_override: true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Allocation sum invariant
    // =========================================================================

    /// *For any* non-degenerate item set and any method, the shares SHALL sum
    /// exactly to the amount and none SHALL be negative.
    #[test]
    fn prop_allocation_sums_to_amount(
        amount in positive_amount(),
        items in item_bases(),
        method in method_strategy(),
    ) {
        let result = AllocationUtil::allocate(amount, &items, method).unwrap();
        prop_assert_eq!(result.len(), items.len());

        let sum: Decimal = result.iter().copied().sum();
        prop_assert_eq!(sum, amount, "method {} lost cents", method);
        for (i, share) in result.iter().enumerate() {
            prop_assert!(*share >= Decimal::ZERO, "share {} is negative: {}", i, share);
        }
    }

    /// *For any* amount and count, the equal split SHALL give every item
    /// `floor(amount / n)` except the last, which absorbs the remainder.
    #[test]
    fn prop_equal_split_only_last_item_deviates(
        amount in positive_amount(),
        count in 1usize..50,
    ) {
        let result = AllocationUtil::allocate_equal(amount, count, CURRENCY_DECIMAL_PLACES);
        let base = money::floor_to(amount / Decimal::from(count as u64), CURRENCY_DECIMAL_PLACES);

        for share in &result[..count - 1] {
            prop_assert_eq!(*share, base);
        }
        let sum: Decimal = result.iter().copied().sum();
        prop_assert_eq!(sum, amount);
    }

    /// *For any* amount, proportional allocation over zero-cost items and
    /// weight-based allocation over weightless items SHALL allocate zero.
    #[test]
    fn prop_degenerate_basis_allocates_zero(
        amount in positive_amount(),
        mut items in item_bases(),
    ) {
        for item in &mut items {
            item.base_cost = Decimal::ZERO;
            item.weight = Decimal::ZERO;
        }

        for method in [CalculationMethod::Proportional, CalculationMethod::WeightBased] {
            let result = AllocationUtil::allocate(amount, &items, method).unwrap();
            prop_assert!(result.iter().all(Decimal::is_zero));
        }
    }

    // =========================================================================
    // Manual override balance rule
    // =========================================================================

    /// *For any* override that moves value between two items, the allocation
    /// SHALL be accepted and still sum to the amount.
    #[test]
    fn prop_rebalanced_override_is_accepted(
        amount in positive_amount(),
        items in prop::collection::vec(item_basis(), 2..10),
        shift_percent in 0u32..=100,
    ) {
        let auto = AllocationUtil::allocate(amount, &items, CalculationMethod::Equal).unwrap();
        let shift = money::floor_to(
            auto[1] * Decimal::from(shift_percent) / Decimal::ONE_HUNDRED,
            CURRENCY_DECIMAL_PLACES,
        );
        let overrides = BTreeMap::from([(0, auto[0] + shift), (1, auto[1] - shift)]);

        let lines = resolve_allocation(
            amount,
            &overridable_category(),
            &overrides,
            &auto,
            DEFAULT_EPSILON,
        )
        .unwrap();
        let sum: Decimal = lines.iter().map(|l| l.allocated_amount).sum();
        prop_assert_eq!(sum, amount);
    }

    /// *For any* override whose total misses the amount by more than one cent,
    /// resolution SHALL fail and report the exact totals.
    #[test]
    fn prop_unbalanced_override_is_rejected(
        amount in positive_amount(),
        excess_cents in 2i64..1_000_000,
    ) {
        let excess = Decimal::new(excess_cents, 2);
        let overrides = BTreeMap::from([(0, amount + excess)]);

        let err = resolve_allocation(
            amount,
            &overridable_category(),
            &overrides,
            &[amount],
            DEFAULT_EPSILON,
        )
        .unwrap_err();
        prop_assert_eq!(
            err,
            LandedCostError::UnbalancedAllocation {
                category: "Customs Duty".into(),
                expected: amount,
                actual: amount + excess,
            }
        );
    }
}
