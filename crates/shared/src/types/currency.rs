//! ISO 4217 currency codes.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts travel as `rust_decimal::Decimal`; this module only names the unit.

use serde::{Deserialize, Serialize};

/// A three-letter ISO 4217 currency code, always stored upper-case.
///
/// Shipments are priced in an arbitrary base currency (e.g. "MVR") and
/// projected to USD for reporting, so the set of codes is open rather than
/// a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// The reporting currency every shipment is projected into.
    pub const USD: &'static str = "USD";

    /// Parses and normalizes a currency code.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly three ASCII letters.
    pub fn parse(code: &str) -> Result<Self, String> {
        let code = code.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(format!("Unknown currency: {code}"))
        }
    }

    /// US Dollar.
    #[must_use]
    pub fn usd() -> Self {
        Self(Self::USD.to_string())
    }

    /// Returns true if this is the US Dollar.
    #[must_use]
    pub fn is_usd(&self) -> bool {
        self.0 == Self::USD
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}
