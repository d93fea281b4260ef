//! Allocation strategies for distributing shared costs.
//!
//! - `method` - the closed set of allocation methods
//! - `auto` - automatic split per method (largest remainder, equal split)
//! - `manual` - per-item overrides and the balancing rule

pub mod auto;
pub mod manual;
pub mod method;

#[cfg(test)]
mod props;

pub use auto::{AllocationBasis, AllocationUtil};
pub use manual::{AllocationLine, resolve_allocation};
pub use method::CalculationMethod;
