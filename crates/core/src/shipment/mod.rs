//! Shipment landed-cost calculation.
//!
//! - `types` - shipment input and the immutable calculation result
//! - `validation` - precondition checks
//! - `calculator` - the orchestrating `ShipmentCalculator`

pub mod calculator;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;

pub use calculator::ShipmentCalculator;
pub use types::{
    CalculationResult, CalculationSummary, ItemBreakdown, ProductPriceUpdate, SharedCost,
    SharedCostBreakdown, Shipment, ShipmentItem,
};
pub use validation::validate_shipment;
