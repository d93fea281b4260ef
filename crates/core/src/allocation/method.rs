//! Allocation method selection.

use serde::{Deserialize, Serialize};

use crate::error::LandedCostError;

/// Rule used to distribute every shared cost of a shipment across its items.
///
/// The method is chosen per shipment and applied uniformly; individual
/// shared costs may still be apportioned by hand (see `manual`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Share follows each item's base cost.
    Proportional,
    /// Every item gets the same share; the last item absorbs rounding.
    Equal,
    /// Share follows each item's weight.
    WeightBased,
    /// Share follows each item's quantity.
    QuantityBased,
}

impl CalculationMethod {
    /// All supported methods, in display order.
    pub const ALL: [Self; 4] = [
        Self::Proportional,
        Self::Equal,
        Self::WeightBased,
        Self::QuantityBased,
    ];

    /// Returns the wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proportional => "proportional",
            Self::Equal => "equal",
            Self::WeightBased => "weight_based",
            Self::QuantityBased => "quantity_based",
        }
    }
}

impl std::fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CalculationMethod {
    type Err = LandedCostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s.trim())
            .ok_or_else(|| LandedCostError::InvalidCalculationMethod(s.to_string()))
    }
}
