//! Harvest-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod reports;
mod symbol;
mod timeframe;

pub use config::{BackoffConfig, HarvestConfig, RateLimitConfig, RetryPolicy};
pub use error::HarvestError;
pub use reports::{HarvestReport, WrittenFile};
pub use symbol::Symbol;
pub use timeframe::Timeframe;
