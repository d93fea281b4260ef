//! Shared types, errors, and configuration for the landed-cost workspace.
//!
//! This crate provides common types used across all other crates:
//! - Currency codes
//! - Typed IDs for catalog references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
