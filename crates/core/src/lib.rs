//! Core business logic for landed-cost calculation.
//!
//! This crate has no web or storage dependencies. It turns a shipment
//! (items plus shared costs) into per-item landed costs.
//!
//! # Modules
//!
//! - `money` - Checked decimal arithmetic and rounding
//! - `allocation` - Splitting one amount across items
//! - `catalog` - Expense categories and default exchange rates
//! - `currency` - Base currency to USD projection
//! - `shipment` - The landed-cost calculator
//! - `error` - Domain errors

pub mod allocation;
pub mod catalog;
pub mod currency;
pub mod error;
pub mod money;
pub mod shipment;

pub use error::LandedCostError;
