//! Landed-cost calculation routes.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppState;
use crate::error::landed_cost_error_response;
use landed_core::LandedCostError;
use landed_core::allocation::CalculationMethod;
use landed_core::catalog::{ExpenseCategory, ExpenseCategoryLookup};
use landed_core::currency::to_usd;
use landed_core::shipment::{
    CalculationResult, SharedCost, Shipment, ShipmentCalculator, ShipmentItem,
};
use landed_shared::types::{CurrencyCode, ExpenseCategoryId, ProductId};

/// Creates the landed-cost routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/landed-cost/calculate", post(calculate))
        .route("/landed-cost/product-prices", post(product_prices))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a landed-cost calculation.
///
/// Decimals may be sent as JSON strings or numbers.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    /// Shipment name, echoed back.
    #[serde(default)]
    pub shipment_name: Option<String>,
    /// Shipment date, echoed back.
    #[serde(default)]
    pub shipment_date: Option<NaiveDate>,
    /// ISO currency code of every amount. Defaults to the configured base currency.
    #[serde(default)]
    pub base_currency: Option<String>,
    /// Base-currency units per 1 USD. Defaults to the configured rate.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    /// One of `proportional`, `equal`, `weight_based`, `quantity_based`.
    pub calculation_method: String,
    /// Purchased items.
    pub items: Vec<ItemRequest>,
    /// Costs to distribute.
    #[serde(default)]
    pub shared_costs: Vec<SharedCostRequest>,
}

/// One item in a calculation request.
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    /// Catalog product, absent for ad-hoc items.
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// Item name.
    pub item_name: String,
    /// Quantity purchased.
    pub quantity: Decimal,
    /// Cost per unit.
    pub unit_cost: Decimal,
    /// Weight, for weight-based allocation.
    #[serde(default)]
    pub weight: Option<Decimal>,
}

/// One shared cost in a calculation request.
#[derive(Debug, Deserialize)]
pub struct SharedCostRequest {
    /// Expense category.
    pub expense_category_id: ExpenseCategoryId,
    /// Description; blank means "use the category name".
    #[serde(default)]
    pub description: String,
    /// Amount to distribute.
    pub amount: Decimal,
    /// Per-item overrides keyed by item index (`{"0": "150"}`).
    #[serde(default)]
    pub manual_allocations: BTreeMap<usize, Decimal>,
}

/// Response for a landed-cost calculation.
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    /// Shipment header.
    pub shipment: ShipmentResponse,
    /// Per-item breakdown.
    pub items: Vec<ItemResponse>,
    /// Per-shared-cost breakdown.
    pub shared_costs: Vec<SharedCostResponse>,
    /// Totals.
    pub calculation_summary: SummaryResponse,
}

/// Shipment header echoed in the response.
#[derive(Debug, Serialize)]
pub struct ShipmentResponse {
    /// Shipment name.
    pub name: Option<String>,
    /// Shipment date (YYYY-MM-DD).
    pub shipment_date: Option<String>,
    /// Base currency.
    pub base_currency: String,
    /// Exchange rate used.
    pub exchange_rate: String,
    /// Method used.
    pub calculation_method: CalculationMethod,
}

/// Item breakdown response.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    /// Position in the request.
    pub index: usize,
    /// Catalog product, if any.
    pub product_id: Option<ProductId>,
    /// Item name.
    pub item_name: String,
    /// Quantity purchased.
    pub quantity: String,
    /// Cost per unit.
    pub unit_cost: String,
    /// Weight, if supplied.
    pub weight: Option<String>,
    /// Quantity times unit cost.
    pub total_item_cost: String,
    /// Share of the shipment base cost as a fraction.
    pub percentage_share: String,
    /// Share of the shipment base cost as a percentage ("50.00%").
    pub percentage_display: String,
    /// Item's share of all shared costs.
    pub allocated_shared_cost: String,
    /// Base cost plus allocated shared cost.
    pub total_landed_cost: String,
    /// Landed cost per unit in the base currency.
    pub landed_cost_per_unit: String,
    /// Landed cost per unit in USD.
    pub landed_cost_per_unit_usd: String,
}

/// Shared cost breakdown response.
#[derive(Debug, Serialize)]
pub struct SharedCostResponse {
    /// Expense category.
    pub expense_category_id: ExpenseCategoryId,
    /// Category name.
    pub category_name: String,
    /// Description.
    pub description: String,
    /// Amount distributed.
    pub amount: String,
    /// Whether any item's share was set by hand.
    pub has_manual_override: bool,
    /// Per-item split.
    pub allocations: Vec<AllocationResponse>,
}

/// One item's share of a shared cost.
#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    /// Item position.
    pub item_index: usize,
    /// Amount allocated.
    pub allocated_amount: String,
    /// Whether the amount came from a manual override.
    pub is_manual_override: bool,
}

/// Totals response.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Sum of item base costs.
    pub total_shipment_base_cost: String,
    /// Sum of shared costs.
    pub total_shared_costs: String,
    /// Base cost plus shared costs.
    pub grand_total_landed_cost: String,
    /// Grand total in USD.
    pub grand_total_landed_cost_usd: String,
    /// Method used.
    pub calculation_method: CalculationMethod,
    /// Base currency.
    pub base_currency: String,
    /// Exchange rate used.
    pub exchange_rate: String,
}

/// Product price write-back response.
#[derive(Debug, Serialize)]
pub struct ProductPricesResponse {
    /// Currency of every landed cost below.
    pub base_currency: String,
    /// New landed cost per product.
    pub updates: Vec<ProductPriceResponse>,
}

/// One product's new landed cost.
#[derive(Debug, Serialize)]
pub struct ProductPriceResponse {
    /// Product to update.
    pub product_id: ProductId,
    /// Landed cost per unit.
    pub landed_cost: String,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Fills a blank shared-cost description with the category name.
pub fn describe_shared_cost(description: &str, category: &ExpenseCategory) -> String {
    if description.trim().is_empty() {
        category.name.clone()
    } else {
        description.to_string()
    }
}

/// Formats a Decimal as a string with 2 decimal places.
fn format_money(amount: Decimal) -> String {
    format!("{amount:.2}")
}

/// Formats a Decimal as a string with 4 decimal places.
fn format_rate(amount: Decimal) -> String {
    format!("{amount:.4}")
}

/// Formats a `[0, 1]` fraction as a percentage with 2 decimal places.
fn format_percentage(share: Decimal) -> String {
    format!("{:.2}%", share * Decimal::ONE_HUNDRED)
}

impl CalculateRequest {
    /// Resolves defaults and maps the request into a core `Shipment`.
    fn into_shipment(self, state: &AppState) -> Result<Shipment, LandedCostError> {
        let calculation_method = CalculationMethod::from_str(&self.calculation_method)?;

        let base_currency = match self.base_currency.as_deref() {
            Some(code) => CurrencyCode::parse(code).map_err(LandedCostError::validation)?,
            None => state.default_base_currency.clone(),
        };

        let exchange_rate = match self.exchange_rate {
            Some(rate) => rate,
            None => state
                .rates
                .default_rate(&base_currency)
                .ok_or(LandedCostError::InvalidExchangeRate(Decimal::ZERO))?,
        };

        let items = self
            .items
            .into_iter()
            .map(|i| ShipmentItem {
                product_id: i.product_id,
                item_name: i.item_name,
                quantity: i.quantity,
                unit_cost: i.unit_cost,
                weight: i.weight,
            })
            .collect();

        let shared_costs = self
            .shared_costs
            .into_iter()
            .map(|c| {
                let description = match state.categories.find(c.expense_category_id) {
                    Some(category) => describe_shared_cost(&c.description, &category),
                    None => c.description,
                };
                SharedCost {
                    expense_category_id: c.expense_category_id,
                    description,
                    amount: c.amount,
                    manual_allocations: c.manual_allocations,
                }
            })
            .collect();

        Ok(Shipment {
            name: self.shipment_name,
            shipment_date: self.shipment_date,
            calculation_method,
            base_currency,
            exchange_rate,
            items,
            shared_costs,
        })
    }
}

impl CalculateResponse {
    /// Formats a result, adding the USD projection of per-unit and total costs.
    fn from_result(result: &CalculationResult) -> Result<Self, LandedCostError> {
        let summary = &result.calculation_summary;
        let currency = &summary.base_currency;
        let rate = summary.exchange_rate;

        let items = result
            .items
            .iter()
            .map(|item| {
                Ok(ItemResponse {
                    index: item.index,
                    product_id: item.product_id,
                    item_name: item.item_name.clone(),
                    quantity: item.quantity.normalize().to_string(),
                    unit_cost: format_money(item.unit_cost),
                    weight: item.weight.map(|w| w.normalize().to_string()),
                    total_item_cost: format_money(item.total_item_cost),
                    percentage_share: format_rate(item.percentage_share),
                    percentage_display: format_percentage(item.percentage_share),
                    allocated_shared_cost: format_money(item.allocated_shared_cost),
                    total_landed_cost: format_money(item.total_landed_cost),
                    landed_cost_per_unit: format_rate(item.landed_cost_per_unit),
                    landed_cost_per_unit_usd: format_rate(to_usd(
                        item.landed_cost_per_unit,
                        currency,
                        rate,
                    )?),
                })
            })
            .collect::<Result<Vec<_>, LandedCostError>>()?;

        let shared_costs = result
            .shared_costs
            .iter()
            .map(|c| SharedCostResponse {
                expense_category_id: c.expense_category_id,
                category_name: c.category_name.clone(),
                description: c.description.clone(),
                amount: format_money(c.amount),
                has_manual_override: c.has_manual_override(),
                allocations: c
                    .allocations
                    .iter()
                    .map(|a| AllocationResponse {
                        item_index: a.item_index,
                        allocated_amount: format_money(a.allocated_amount),
                        is_manual_override: a.is_manual_override,
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            shipment: ShipmentResponse {
                name: result.shipment_name.clone(),
                shipment_date: result.shipment_date.map(|d| d.to_string()),
                base_currency: currency.to_string(),
                exchange_rate: format_rate(rate),
                calculation_method: summary.calculation_method,
            },
            items,
            shared_costs,
            calculation_summary: SummaryResponse {
                total_shipment_base_cost: format_money(summary.total_shipment_base_cost),
                total_shared_costs: format_money(summary.total_shared_costs),
                grand_total_landed_cost: format_money(summary.grand_total_landed_cost),
                grand_total_landed_cost_usd: format_money(to_usd(
                    summary.grand_total_landed_cost,
                    currency,
                    rate,
                )?),
                calculation_method: summary.calculation_method,
                base_currency: currency.to_string(),
                exchange_rate: format_rate(rate),
            },
        })
    }
}

fn run_calculation(
    state: &AppState,
    request: CalculateRequest,
) -> Result<CalculationResult, LandedCostError> {
    let shipment = request.into_shipment(state)?;
    debug!(
        items = shipment.items.len(),
        shared_costs = shipment.shared_costs.len(),
        base_currency = %shipment.base_currency,
        "Calculating landed costs"
    );
    ShipmentCalculator::new(state.categories.as_ref())
        .with_epsilon(state.allocation_tolerance)
        .calculate(&shipment)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /landed-cost/calculate
async fn calculate(
    State(state): State<AppState>,
    Json(request): Json<CalculateRequest>,
) -> Response {
    let response = run_calculation(&state, request)
        .and_then(|result| CalculateResponse::from_result(&result));

    match response {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => landed_cost_error_response(&e),
    }
}

/// POST /landed-cost/product-prices
///
/// Computes the shipment and returns the per-unit landed cost of every
/// catalog product in it. Nothing is written.
async fn product_prices(
    State(state): State<AppState>,
    Json(request): Json<CalculateRequest>,
) -> Response {
    match run_calculation(&state, request) {
        Ok(result) => {
            let body = ProductPricesResponse {
                base_currency: result.calculation_summary.base_currency.to_string(),
                updates: result
                    .product_price_updates()
                    .into_iter()
                    .map(|u| ProductPriceResponse {
                        product_id: u.product_id,
                        landed_cost: format_rate(u.landed_cost),
                    })
                    .collect(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => landed_cost_error_response(&e),
    }
}
