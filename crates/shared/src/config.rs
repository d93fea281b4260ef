//! Application configuration management.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppResult;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Calculation defaults.
    pub calculation: CalculationConfig,
    /// Currency reference data.
    pub currency: CurrencyConfig,
    /// Expense categories known to the calculator.
    pub expense_categories: Vec<ExpenseCategoryConfig>,
    /// Logging configuration.
    pub log: LogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Calculation defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculationConfig {
    /// Base currency assumed when a request does not name one.
    #[serde(default = "default_base_currency")]
    pub default_base_currency: String,
    /// Tolerance for the manual allocation balance check, in base-currency units.
    #[serde(default = "default_allocation_tolerance")]
    pub allocation_tolerance: Decimal,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            default_base_currency: default_base_currency(),
            allocation_tolerance: default_allocation_tolerance(),
        }
    }
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_allocation_tolerance() -> Decimal {
    Decimal::new(1, 2) // one cent
}

/// Currency reference data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrencyConfig {
    /// Default exchange rates keyed by currency code, in units per 1 USD.
    #[serde(default)]
    pub default_rates: BTreeMap<String, Decimal>,
}

/// One expense category entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseCategoryConfig {
    /// Category key.
    pub id: i64,
    /// Display name, also used as the default shared-cost description.
    pub name: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether shared costs in this category may be apportioned by hand.
    #[serde(default)]
    pub allows_item_override: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if a source cannot be read or the
    /// merged values do not deserialize.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LANDED").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
