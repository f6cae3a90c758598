//! Builder for composing connectors with middleware layers.
//!
//! Layers form an onion around the raw connector. The `layers` vector stores
//! them outermost-first (last added = outermost) and `build()` applies them in
//! reverse so the result nests as `layers[0](layers[1](...(raw)))`.
//!
//! ```text
//! builder.with_rate_limit(..).layer(custom)
//!
//! Storage: [Custom, RateLimit]
//! Applied:  Raw -> RateLimit -> Custom
//! Result:   Custom(RateLimit(Raw))
//! ```

use std::sync::Arc;
use std::time::Duration;

use harvest_core::Middleware;
use harvest_core::connector::ExchangeConnector;
use harvest_types::RateLimitConfig;
use serde_json::json;

use crate::rate_limit::{RateLimitMiddleware, RateLimiter};

const RATE_LIMIT: &str = "RateLimitedConnector";

/// Generic middleware builder for composing a connector with layered wrappers.
pub struct ConnectorBuilder {
    raw: Arc<dyn ExchangeConnector>,
    /// Middleware layers in outermost-first order.
    layers: Vec<Box<dyn Middleware>>,
}

impl ConnectorBuilder {
    /// Create a new builder from a raw, unwrapped connector.
    #[must_use]
    pub fn new(raw: Arc<dyn ExchangeConnector>) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    fn existing_rate_limit(&self) -> Option<RateLimitConfig> {
        let layer = self.layers.iter().find(|l| l.name() == RATE_LIMIT)?;
        let cfg = layer.config_json();
        let interval = cfg
            .get("interval_ms")
            .and_then(serde_json::Value::as_u64)
            .map_or_else(|| self.raw.min_request_interval(), Duration::from_millis);
        let burst = cfg
            .get("burst")
            .and_then(serde_json::Value::as_u64)
            .and_then(|b| u32::try_from(b).ok())
            .unwrap_or(1);
        Some(RateLimitConfig { interval, burst })
    }

    /// Add or replace the rate limiter with explicit token-bucket parameters.
    ///
    /// The limiter is inserted outermost so it gates every request.
    #[must_use]
    pub fn with_rate_limit(mut self, cfg: RateLimitConfig) -> Self {
        self.layers.retain(|m| m.name() != RATE_LIMIT);
        self.layers.insert(0, Box::new(RateLimitMiddleware::new(cfg)));
        self
    }

    /// Add or replace the rate limiter, spaced by the raw connector's minimum
    /// request interval.
    #[must_use]
    pub fn with_default_rate_limit(mut self) -> Self {
        self.layers.retain(|m| m.name() != RATE_LIMIT);
        self.layers
            .insert(0, Box::new(RateLimitMiddleware::from_connector()));
        self
    }

    /// Add or replace the rate limiter with one shared across connectors.
    #[must_use]
    pub fn with_shared_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.layers.retain(|m| m.name() != RATE_LIMIT);
        self.layers
            .insert(0, Box::new(RateLimitMiddleware::shared(limiter)));
        self
    }

    /// Remove the rate limiter if present.
    #[must_use]
    pub fn without_rate_limit(mut self) -> Self {
        self.layers.retain(|m| m.name() != RATE_LIMIT);
        self
    }

    /// Shortcut: set the refill interval (preserves an existing burst).
    #[must_use]
    pub fn rate_limit_interval(self, interval: Duration) -> Self {
        let mut cfg = self
            .existing_rate_limit()
            .unwrap_or_else(|| RateLimitConfig::every(interval));
        cfg.interval = interval;
        self.with_rate_limit(cfg)
    }

    /// Shortcut: set the burst size (preserves an existing interval).
    #[must_use]
    pub fn rate_limit_burst(self, burst: u32) -> Self {
        let mut cfg = self
            .existing_rate_limit()
            .unwrap_or_else(|| RateLimitConfig::every(self.raw.min_request_interval()));
        cfg.burst = burst;
        self.with_rate_limit(cfg)
    }

    /// Names of the configured layers, outermost first.
    #[must_use]
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    /// Snapshot of the stack for inspection, outermost first.
    ///
    /// The raw connector is appended as the innermost entry.
    #[must_use]
    pub fn describe(&self) -> serde_json::Value {
        let mut out: Vec<serde_json::Value> = self
            .layers
            .iter()
            .map(|l| json!({ "name": l.name(), "config": l.config_json() }))
            .collect();
        out.push(json!({
            "name": "RawConnector",
            "config": { "name": self.raw.name() },
        }));
        serde_json::Value::Array(out)
    }

    /// Build the wrapped connector, applying layers innermost first.
    #[must_use]
    pub fn build(self) -> Arc<dyn ExchangeConnector> {
        let mut acc: Arc<dyn ExchangeConnector> = Arc::clone(&self.raw);
        for m in self.layers.into_iter().rev() {
            acc = m.apply(acc);
        }
        acc
    }

    /// Add an arbitrary middleware layer at the outermost position.
    #[must_use]
    pub fn layer(mut self, layer: Box<dyn Middleware>) -> Self {
        self.layers.insert(0, layer);
        self
    }
}
