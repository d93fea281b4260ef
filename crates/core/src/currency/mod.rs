//! Currency projection for reporting.

pub mod projection;

#[cfg(test)]
mod props;

pub use projection::{ensure_valid_rate, from_usd, to_usd};
