//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - The landed-cost calculation endpoints
//! - Expense category listing
//! - JSON error mapping for `LandedCostError`

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use rust_decimal::Decimal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use landed_core::catalog::{
    ExchangeRateSource, ExpenseCategory, InMemoryCategoryCatalog, StaticRateTable,
};
use landed_shared::types::{CurrencyCode, ExpenseCategoryId};
use landed_shared::{AppConfig, AppError, AppResult};

/// Application state shared across handlers.
///
/// Everything here is read-only reference data, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    /// Expense categories known to the calculator.
    pub categories: Arc<InMemoryCategoryCatalog>,
    /// Default exchange rates used when a request omits one.
    pub rates: Arc<dyn ExchangeRateSource>,
    /// Base currency assumed when a request omits one.
    pub default_base_currency: CurrencyCode,
    /// Tolerance of the manual allocation balance check.
    pub allocation_tolerance: Decimal,
}

impl AppState {
    /// Builds the state from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if a currency code is malformed or
    /// a configured rate is not positive.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let default_base_currency = CurrencyCode::parse(&config.calculation.default_base_currency)
            .map_err(AppError::Configuration)?;

        let mut rates = Vec::with_capacity(config.currency.default_rates.len());
        for (code, rate) in &config.currency.default_rates {
            let code = CurrencyCode::parse(code).map_err(AppError::Configuration)?;
            if *rate <= Decimal::ZERO {
                return Err(AppError::Configuration(format!(
                    "default rate for {code} must be positive, got {rate}"
                )));
            }
            rates.push((code, *rate));
        }

        let categories = config.expense_categories.iter().map(|c| ExpenseCategory {
            id: ExpenseCategoryId::new(c.id),
            name: c.name.clone(),
            description: c.description.clone(),
            allows_item_override: c.allows_item_override,
        });

        let state = Self {
            categories: Arc::new(InMemoryCategoryCatalog::new(categories)),
            rates: Arc::new(StaticRateTable::new(rates)),
            default_base_currency,
            allocation_tolerance: config.calculation.allocation_tolerance,
        };

        info!(
            categories = config.expense_categories.len(),
            default_rates = config.currency.default_rates.len(),
            base_currency = %state.default_base_currency,
            "Reference data loaded"
        );

        Ok(state)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
