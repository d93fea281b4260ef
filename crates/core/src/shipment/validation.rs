//! Precondition checks run before any landed cost is computed.

use rust_decimal::Decimal;

use super::types::Shipment;
use crate::currency::ensure_valid_rate;
use crate::error::LandedCostError;

/// Validates a shipment's inputs.
///
/// # Errors
///
/// Returns `Validation` naming the offending item or shared cost, or
/// `InvalidExchangeRate` for a non-positive rate.
pub fn validate_shipment(shipment: &Shipment) -> Result<(), LandedCostError> {
    if shipment.items.is_empty() {
        return Err(LandedCostError::validation(
            "shipment must contain at least one item",
        ));
    }

    ensure_valid_rate(shipment.exchange_rate)?;

    for (index, item) in shipment.items.iter().enumerate() {
        if item.quantity <= Decimal::ZERO {
            return Err(LandedCostError::validation(format!(
                "item {index} (\"{}\") must have a positive quantity, got {}",
                item.item_name, item.quantity
            )));
        }
        if item.unit_cost < Decimal::ZERO {
            return Err(LandedCostError::validation(format!(
                "item {index} (\"{}\") cannot have a negative unit cost",
                item.item_name
            )));
        }
        if item.weight.is_some_and(|w| w < Decimal::ZERO) {
            return Err(LandedCostError::validation(format!(
                "item {index} (\"{}\") cannot have a negative weight",
                item.item_name
            )));
        }
    }

    for (index, cost) in shipment.shared_costs.iter().enumerate() {
        if cost.amount < Decimal::ZERO {
            return Err(LandedCostError::validation(format!(
                "shared cost {index} (\"{}\") cannot have a negative amount",
                cost.description
            )));
        }
    }

    Ok(())
}
