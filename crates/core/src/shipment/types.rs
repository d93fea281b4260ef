//! Shipment input and calculation result types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::{AllocationLine, CalculationMethod};
use landed_shared::types::{CurrencyCode, ExpenseCategoryId, ProductId};

/// One purchased line in a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentItem {
    /// Catalog product, absent for ad-hoc items.
    pub product_id: Option<ProductId>,
    /// Item name as shown on the shipment.
    pub item_name: String,
    /// Quantity purchased; must be positive.
    pub quantity: Decimal,
    /// Cost per unit in the base currency; must not be negative.
    pub unit_cost: Decimal,
    /// Weight, only needed for weight-based allocation.
    pub weight: Option<Decimal>,
}

/// One shipment-level cost to distribute across the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedCost {
    /// Category controlling whether manual overrides are allowed.
    pub expense_category_id: ExpenseCategoryId,
    /// Free-text description.
    pub description: String,
    /// Amount in the base currency; must not be negative.
    pub amount: Decimal,
    /// Sparse per-item overrides keyed by item index. Empty means automatic.
    #[serde(default)]
    pub manual_allocations: BTreeMap<usize, Decimal>,
}

/// The aggregate handed to the calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    /// Optional shipment name, carried through to the result.
    pub name: Option<String>,
    /// Optional shipment date, carried through to the result.
    pub shipment_date: Option<NaiveDate>,
    /// Method applied to every shared cost.
    pub calculation_method: CalculationMethod,
    /// Currency of every amount in the shipment.
    pub base_currency: CurrencyCode,
    /// Base-currency units per 1 USD.
    pub exchange_rate: Decimal,
    /// Purchased items.
    pub items: Vec<ShipmentItem>,
    /// Costs to distribute.
    pub shared_costs: Vec<SharedCost>,
}

/// An item with its computed landed cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBreakdown {
    /// Position of the item in the shipment.
    pub index: usize,
    /// Catalog product, if any.
    pub product_id: Option<ProductId>,
    /// Item name.
    pub item_name: String,
    /// Quantity purchased.
    pub quantity: Decimal,
    /// Cost per unit.
    pub unit_cost: Decimal,
    /// Weight, if supplied.
    pub weight: Option<Decimal>,
    /// `quantity * unit_cost`.
    pub total_item_cost: Decimal,
    /// Fraction in `[0, 1]` of the shipment's base cost.
    pub percentage_share: Decimal,
    /// Sum of this item's share of every shared cost.
    pub allocated_shared_cost: Decimal,
    /// `total_item_cost + allocated_shared_cost`.
    pub total_landed_cost: Decimal,
    /// `total_landed_cost / quantity`.
    pub landed_cost_per_unit: Decimal,
}

/// A shared cost with its per-item split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedCostBreakdown {
    /// Category key.
    pub expense_category_id: ExpenseCategoryId,
    /// Category name, for display.
    pub category_name: String,
    /// Description.
    pub description: String,
    /// Amount distributed.
    pub amount: Decimal,
    /// One line per item, in item order.
    pub allocations: Vec<AllocationLine>,
}

impl SharedCostBreakdown {
    /// Returns true if any item's share was set by hand.
    #[must_use]
    pub fn has_manual_override(&self) -> bool {
        self.allocations.iter().any(|a| a.is_manual_override)
    }
}

/// Shipment-level totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationSummary {
    /// Sum of every item's base cost.
    pub total_shipment_base_cost: Decimal,
    /// Sum of every shared cost amount.
    pub total_shared_costs: Decimal,
    /// Base cost plus shared costs.
    pub grand_total_landed_cost: Decimal,
    /// Method used.
    pub calculation_method: CalculationMethod,
    /// Base currency.
    pub base_currency: CurrencyCode,
    /// Base-currency units per 1 USD.
    pub exchange_rate: Decimal,
}

/// Immutable output of a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Shipment name, if supplied.
    pub shipment_name: Option<String>,
    /// Shipment date, if supplied.
    pub shipment_date: Option<NaiveDate>,
    /// Per-item breakdown, in input order.
    pub items: Vec<ItemBreakdown>,
    /// Per-shared-cost breakdown, in input order.
    pub shared_costs: Vec<SharedCostBreakdown>,
    /// Totals.
    pub calculation_summary: CalculationSummary,
}

/// New landed cost for a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPriceUpdate {
    /// Product to update.
    pub product_id: ProductId,
    /// Landed cost per unit, in the shipment's base currency.
    pub landed_cost: Decimal,
}

impl CalculationResult {
    /// Lists the per-unit landed costs a price update would write back.
    ///
    /// Ad-hoc items without a product are skipped. If the same product
    /// appears on several lines, the last line wins.
    #[must_use]
    pub fn product_price_updates(&self) -> Vec<ProductPriceUpdate> {
        let mut by_product: BTreeMap<ProductId, Decimal> = BTreeMap::new();
        for item in &self.items {
            if let Some(product_id) = item.product_id {
                by_product.insert(product_id, item.landed_cost_per_unit);
            }
        }
        by_product
            .into_iter()
            .map(|(product_id, landed_cost)| ProductPriceUpdate {
                product_id,
                landed_cost,
            })
            .collect()
    }
}
