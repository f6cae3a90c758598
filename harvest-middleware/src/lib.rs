//! harvest-middleware
//!
//! Connector wrappers and the builder that composes them.

mod builder;
mod rate_limit;

pub use crate::builder::ConnectorBuilder;
pub use crate::rate_limit::{RateLimitMiddleware, RateLimitedConnector, RateLimiter};
