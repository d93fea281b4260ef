//! Landed-cost calculation for a whole shipment.

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::types::{
    CalculationResult, CalculationSummary, ItemBreakdown, SharedCostBreakdown, Shipment,
};
use super::validation::validate_shipment;
use crate::allocation::{AllocationBasis, AllocationUtil, resolve_allocation};
use crate::catalog::{ExpenseCategory, ExpenseCategoryLookup};
use crate::error::LandedCostError;
use crate::money::{self, DEFAULT_EPSILON};

/// Computes landed costs.
///
/// The calculator is pure: it reads the shipment and the category lookup,
/// writes nothing, and returns either a complete result or a single error.
/// Persisting the result is the caller's job.
pub struct ShipmentCalculator<'a> {
    categories: &'a dyn ExpenseCategoryLookup,
    epsilon: Decimal,
}

impl<'a> ShipmentCalculator<'a> {
    /// Creates a calculator using the default one-cent balance tolerance.
    #[must_use]
    pub fn new(categories: &'a dyn ExpenseCategoryLookup) -> Self {
        Self {
            categories,
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// Overrides the tolerance of the manual allocation balance check.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: Decimal) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Calculates the landed cost of every item in `shipment`.
    ///
    /// 1. Validate the inputs and resolve every shared cost's category
    /// 2. Compute each item's base cost and the shipment total
    /// 3. Split every shared cost (automatic or validated manual)
    /// 4. Accumulate each item's share and derive the per-unit landed cost
    ///
    /// # Errors
    ///
    /// Returns the first precondition or allocation failure found. No
    /// partially computed result is ever returned.
    pub fn calculate(&self, shipment: &Shipment) -> Result<CalculationResult, LandedCostError> {
        validate_shipment(shipment)?;
        let categories = self.resolve_categories(shipment)?;

        debug!(
            items = shipment.items.len(),
            shared_costs = shipment.shared_costs.len(),
            method = %shipment.calculation_method,
            "calculating landed costs"
        );

        let bases = shipment
            .items
            .iter()
            .map(|item| {
                Ok(AllocationBasis {
                    base_cost: money::multiply(item.quantity, item.unit_cost)?,
                    weight: item.weight.unwrap_or(Decimal::ZERO),
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, LandedCostError>>()?;

        let total_base_cost = money::sum(bases.iter().map(|b| b.base_cost))?;
        let total_shared_costs = money::sum(shipment.shared_costs.iter().map(|c| c.amount))?;

        let mut allocated = vec![Decimal::ZERO; bases.len()];
        let mut shared_costs = Vec::with_capacity(shipment.shared_costs.len());

        for (cost, category) in shipment.shared_costs.iter().zip(categories) {
            let auto = AllocationUtil::allocate(cost.amount, &bases, shipment.calculation_method)?;
            let lines = resolve_allocation(
                cost.amount,
                &category,
                &cost.manual_allocations,
                &auto,
                self.epsilon,
            )?;

            for line in &lines {
                allocated[line.item_index] =
                    money::add(allocated[line.item_index], line.allocated_amount)?;
            }

            shared_costs.push(SharedCostBreakdown {
                expense_category_id: cost.expense_category_id,
                category_name: category.name,
                description: cost.description.clone(),
                amount: cost.amount,
                allocations: lines,
            });
        }

        let items = shipment
            .items
            .iter()
            .zip(bases.iter().zip(allocated))
            .enumerate()
            .map(|(index, (item, (basis, allocated_shared_cost)))| {
                let total_landed_cost = money::add(basis.base_cost, allocated_shared_cost)?;
                let landed_cost_per_unit = money::round_rate(money::divide(
                    total_landed_cost,
                    item.quantity,
                    "landed cost per unit",
                )?);
                let percentage_share = if total_base_cost.is_zero() {
                    Decimal::ZERO
                } else {
                    money::round_rate(money::divide(
                        basis.base_cost,
                        total_base_cost,
                        "percentage share",
                    )?)
                };

                Ok(ItemBreakdown {
                    index,
                    product_id: item.product_id,
                    item_name: item.item_name.clone(),
                    quantity: item.quantity,
                    unit_cost: item.unit_cost,
                    weight: item.weight,
                    total_item_cost: basis.base_cost,
                    percentage_share,
                    allocated_shared_cost,
                    total_landed_cost,
                    landed_cost_per_unit,
                })
            })
            .collect::<Result<Vec<_>, LandedCostError>>()?;

        let grand_total_landed_cost = money::add(total_base_cost, total_shared_costs)?;

        info!(
            method = %shipment.calculation_method,
            base_currency = %shipment.base_currency,
            total_base_cost = %total_base_cost,
            total_shared_costs = %total_shared_costs,
            grand_total = %grand_total_landed_cost,
            "landed costs calculated"
        );

        Ok(CalculationResult {
            shipment_name: shipment.name.clone(),
            shipment_date: shipment.shipment_date,
            items,
            shared_costs,
            calculation_summary: CalculationSummary {
                total_shipment_base_cost: total_base_cost,
                total_shared_costs,
                grand_total_landed_cost,
                calculation_method: shipment.calculation_method,
                base_currency: shipment.base_currency.clone(),
                exchange_rate: shipment.exchange_rate,
            },
        })
    }

    fn resolve_categories(
        &self,
        shipment: &Shipment,
    ) -> Result<Vec<ExpenseCategory>, LandedCostError> {
        shipment
            .shared_costs
            .iter()
            .map(|cost| {
                self.categories
                    .find(cost.expense_category_id)
                    .ok_or(LandedCostError::UnknownExpenseCategory(cost.expense_category_id))
            })
            .collect()
    }
}
