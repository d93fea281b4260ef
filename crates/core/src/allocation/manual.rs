//! Reconciliation of per-item manual overrides with the automatic split.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::ExpenseCategory;
use crate::error::LandedCostError;
use crate::money;

/// One item's share of one shared cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    /// Index of the item in the shipment's item list.
    pub item_index: usize,
    /// Amount of the shared cost charged to this item.
    pub allocated_amount: Decimal,
    /// True when the amount came from the caller rather than the method.
    pub is_manual_override: bool,
}

/// Resolves the effective allocation of one shared cost.
///
/// `auto` holds the method's share for every item, in item order. When
/// `overrides` is empty the automatic split is used unchanged. Otherwise
/// listed items take their manual amount and unlisted items keep their
/// automatic share, and the effective total must match `amount` within
/// `epsilon`.
///
/// # Errors
///
/// - `OverrideNotAllowed` if overrides are given for a category that does not
///   permit them, whether or not they balance.
/// - `Validation` if an override names an item index that does not exist or
///   carries a negative amount.
/// - `UnbalancedAllocation` if the effective total misses `amount` by more
///   than `epsilon`.
pub fn resolve_allocation(
    amount: Decimal,
    category: &ExpenseCategory,
    overrides: &BTreeMap<usize, Decimal>,
    auto: &[Decimal],
    epsilon: Decimal,
) -> Result<Vec<AllocationLine>, LandedCostError> {
    if overrides.is_empty() {
        return Ok(auto
            .iter()
            .enumerate()
            .map(|(item_index, share)| AllocationLine {
                item_index,
                allocated_amount: *share,
                is_manual_override: false,
            })
            .collect());
    }

    if !category.allows_item_override {
        warn!(
            category = %category.name,
            "manual allocation rejected, category does not allow overrides"
        );
        return Err(LandedCostError::OverrideNotAllowed {
            category: category.name.clone(),
        });
    }

    for (&item_index, &value) in overrides {
        if item_index >= auto.len() {
            return Err(LandedCostError::validation(format!(
                "manual allocation for \"{}\" references item {item_index} of {}",
                category.name,
                auto.len()
            )));
        }
        if value < Decimal::ZERO {
            return Err(LandedCostError::validation(format!(
                "manual allocation for \"{}\" on item {item_index} cannot be negative",
                category.name
            )));
        }
    }

    let lines: Vec<AllocationLine> = auto
        .iter()
        .enumerate()
        .map(|(item_index, share)| match overrides.get(&item_index) {
            Some(value) => AllocationLine {
                item_index,
                allocated_amount: *value,
                is_manual_override: true,
            },
            None => AllocationLine {
                item_index,
                allocated_amount: *share,
                is_manual_override: false,
            },
        })
        .collect();

    let actual = money::sum(lines.iter().map(|l| l.allocated_amount))?;
    if !money::nearly_equal(actual, amount, epsilon) {
        warn!(
            category = %category.name,
            expected = %amount,
            actual = %actual,
            "manual allocation does not balance"
        );
        return Err(LandedCostError::UnbalancedAllocation {
            category: category.name.clone(),
            expected: amount,
            actual,
        });
    }

    Ok(lines)
}
