//! Read-only reference data consumed by the calculator.
//!
//! Expense categories and default exchange rates are owned elsewhere (the
//! catalog and currency services). The engine only reads them through the
//! traits below, so lookups need no locking while calculations run.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use landed_shared::types::{CurrencyCode, ExpenseCategoryId};

/// Classification of a shared cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    /// Category key.
    pub id: ExpenseCategoryId,
    /// Display name ("Freight", "Customs Duty", ...).
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Whether costs in this category may be apportioned per item by hand.
    pub allows_item_override: bool,
}

/// Looks up expense categories by id.
pub trait ExpenseCategoryLookup: Send + Sync {
    /// Returns the category, if known.
    fn find(&self, id: ExpenseCategoryId) -> Option<ExpenseCategory>;
}

/// Supplies a default exchange rate when a request does not carry one.
pub trait ExchangeRateSource: Send + Sync {
    /// Returns base-currency units per 1 USD, if known.
    fn default_rate(&self, currency: &CurrencyCode) -> Option<Decimal>;
}

/// In-memory category catalog, typically built from configuration.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCategoryCatalog {
    categories: HashMap<ExpenseCategoryId, ExpenseCategory>,
}

impl InMemoryCategoryCatalog {
    /// Builds a catalog from a list of categories; later duplicates win.
    #[must_use]
    pub fn new(categories: impl IntoIterator<Item = ExpenseCategory>) -> Self {
        Self {
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Returns all categories ordered by id.
    #[must_use]
    pub fn all(&self) -> Vec<ExpenseCategory> {
        let mut all: Vec<ExpenseCategory> = self.categories.values().cloned().collect();
        all.sort_by_key(|c| c.id);
        all
    }
}

impl ExpenseCategoryLookup for InMemoryCategoryCatalog {
    fn find(&self, id: ExpenseCategoryId) -> Option<ExpenseCategory> {
        self.categories.get(&id).cloned()
    }
}

/// Fixed table of default rates. USD always resolves to 1.
#[derive(Debug, Clone, Default)]
pub struct StaticRateTable {
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl StaticRateTable {
    /// Builds a table from `(code, rate)` pairs.
    #[must_use]
    pub fn new(rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>) -> Self {
        Self {
            rates: rates.into_iter().collect(),
        }
    }
}

impl ExchangeRateSource for StaticRateTable {
    fn default_rate(&self, currency: &CurrencyCode) -> Option<Decimal> {
        if currency.is_usd() {
            return Some(Decimal::ONE);
        }
        self.rates.get(currency).copied()
    }
}
