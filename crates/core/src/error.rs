//! Landed-cost error types.
//!
//! Every variant is a deterministic input-validation failure. None of them is
//! retryable; callers surface the message and the offending entity (item
//! index or category name) to the user.

use landed_shared::types::ExpenseCategoryId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while computing landed costs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LandedCostError {
    // ========== Validation Errors ==========
    /// Malformed shipment input (empty item list, zero quantity, ...).
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description naming the offending entity.
        message: String,
    },

    /// Shared cost references a category the lookup does not know.
    #[error("Expense category not found: {0}")]
    UnknownExpenseCategory(ExpenseCategoryId),

    /// Calculation method is not one of the supported values.
    #[error("Invalid calculation method: {0}")]
    InvalidCalculationMethod(String),

    /// Exchange rate must be positive.
    #[error("Exchange rate must be positive, got {0}")]
    InvalidExchangeRate(Decimal),

    // ========== Allocation Errors ==========
    /// Manual allocations do not add up to the shared cost amount.
    #[error(
        "Manual allocations for \"{category}\" must sum to {expected}. Current total: {actual}"
    )]
    UnbalancedAllocation {
        /// Category name of the offending shared cost.
        category: String,
        /// The shared cost amount.
        expected: Decimal,
        /// Sum of the effective per-item allocations.
        actual: Decimal,
    },

    /// Manual allocations supplied for a category that does not allow them.
    #[error("Expense category \"{category}\" does not allow item-level overrides")]
    OverrideNotAllowed {
        /// Category name of the offending shared cost.
        category: String,
    },

    // ========== Arithmetic Errors ==========
    /// Division by zero reached the decimal layer.
    #[error("Division by zero while computing {context}")]
    DivisionByZero {
        /// What was being divided.
        context: &'static str,
    },

    /// Decimal arithmetic overflowed.
    #[error("Arithmetic overflow while computing {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: &'static str,
    },
}

impl LandedCostError {
    /// Builds a validation error from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns the snake_case error code used in API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::UnknownExpenseCategory(_) => "unknown_expense_category",
            Self::InvalidCalculationMethod(_) => "invalid_calculation_method",
            Self::InvalidExchangeRate(_) => "invalid_exchange_rate",
            Self::UnbalancedAllocation { .. } => "unbalanced_allocation",
            Self::OverrideNotAllowed { .. } => "override_not_allowed",
            Self::DivisionByZero { .. } => "division_by_zero",
            Self::ArithmeticOverflow { .. } => "arithmetic_overflow",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. }
            | Self::UnknownExpenseCategory(_)
            | Self::InvalidCalculationMethod(_)
            | Self::InvalidExchangeRate(_) => 400,
            Self::UnbalancedAllocation { .. } | Self::OverrideNotAllowed { .. } => 422,
            Self::DivisionByZero { .. } | Self::ArithmeticOverflow { .. } => 500,
        }
    }
}
