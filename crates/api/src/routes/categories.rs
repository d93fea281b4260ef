//! Expense category listing.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;
use landed_core::catalog::ExpenseCategory;
use landed_shared::types::ExpenseCategoryId;

/// Creates the expense category routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/expense-categories", get(list_categories))
}

/// One configured expense category.
#[derive(Debug, Serialize)]
pub struct ExpenseCategoryResponse {
    /// Category id, referenced by shared costs.
    pub id: ExpenseCategoryId,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether per-item manual allocations are accepted.
    pub allows_item_override: bool,
}

impl From<ExpenseCategory> for ExpenseCategoryResponse {
    fn from(c: ExpenseCategory) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            allows_item_override: c.allows_item_override,
        }
    }
}

/// GET /expense-categories
async fn list_categories(State(state): State<AppState>) -> Json<Vec<ExpenseCategoryResponse>> {
    Json(
        state
            .categories
            .all()
            .into_iter()
            .map(ExpenseCategoryResponse::from)
            .collect(),
    )
}
