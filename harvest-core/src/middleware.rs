//! Middleware trait for wrapping `ExchangeConnector` implementations.

use std::sync::Arc;

use crate::connector::ExchangeConnector;

/// Trait implemented by connector middleware layers.
///
/// A middleware consumes an inner `ExchangeConnector` and returns a wrapped
/// connector that augments or restricts behavior (e.g., rate limiting).
pub trait Middleware: Send + Sync {
    /// Apply this middleware to wrap an inner connector and return the wrapped connector.
    fn apply(self: Box<Self>, inner: Arc<dyn ExchangeConnector>) -> Arc<dyn ExchangeConnector>;

    /// Human-readable middleware name for introspection/logging.
    fn name(&self) -> &'static str;

    /// Opaque configuration snapshot for serialization/inspection.
    fn config_json(&self) -> serde_json::Value;
}
