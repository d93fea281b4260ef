//! Maps domain errors to JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{error, warn};

use landed_core::LandedCostError;

/// Maps a calculation error to an HTTP response.
///
/// The body is `{ "error", "message" }` plus the fields a caller needs to
/// point at the offending category or rate.
pub fn landed_cost_error_response(e: &LandedCostError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %e, "Landed cost calculation failed");
    } else {
        warn!(error = %e, code = e.error_code(), "Landed cost request rejected");
    }

    let mut body = json!({
        "error": e.error_code(),
        "message": e.to_string(),
    });

    if let Value::Object(fields) = &mut body {
        match e {
            LandedCostError::UnbalancedAllocation {
                category,
                expected,
                actual,
            } => {
                fields.insert("category".into(), json!(category));
                fields.insert("expected".into(), json!(expected.to_string()));
                fields.insert("actual".into(), json!(actual.to_string()));
                fields.insert("difference".into(), json!((*actual - *expected).to_string()));
            }
            LandedCostError::OverrideNotAllowed { category } => {
                fields.insert("category".into(), json!(category));
            }
            LandedCostError::UnknownExpenseCategory(id) => {
                fields.insert("expense_category_id".into(), json!(id));
            }
            LandedCostError::InvalidExchangeRate(rate) => {
                fields.insert("exchange_rate".into(), json!(rate.to_string()));
            }
            LandedCostError::InvalidCalculationMethod(method) => {
                fields.insert("calculation_method".into(), json!(method));
            }
            _ => {}
        }
    }

    (status, Json(body)).into_response()
}
