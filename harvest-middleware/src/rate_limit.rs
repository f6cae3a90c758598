//! Token-bucket rate limiting in front of every exchange request.
//!
//! The bucket starts full. Each request takes one token; tokens refill one per
//! `interval` up to `burst`. A request arriving at an empty bucket sleeps until
//! the next refill.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use harvest_core::connector::{ExchangeConnector, MarketsProvider, OhlcvProvider};
use harvest_core::{Candle, HarvestError, Market, Middleware, OhlcvRequest, Symbol, Timeframe};
use harvest_types::RateLimitConfig;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Shareable token bucket.
///
/// Clone the surrounding `Arc` to let several connectors draw from one budget.
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<Bucket>,
}

struct Bucket {
    tokens: u32,
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a full bucket. A `burst` of zero is treated as one.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        let config = RateLimitConfig {
            interval: config.interval,
            burst: config.burst.max(1),
        };
        Self {
            state: Mutex::new(Bucket {
                tokens: config.burst,
                last_refill: Instant::now(),
            }),
            config,
        }
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Take one token, sleeping until one is available.
    pub async fn acquire(&self) {
        if self.config.interval.is_zero() {
            return;
        }
        loop {
            let wait = {
                let mut bucket = self.state.lock().await;
                self.refill(&mut bucket, Instant::now());
                if bucket.tokens > 0 {
                    bucket.tokens -= 1;
                    return;
                }
                self.config
                    .interval
                    .saturating_sub(bucket.last_refill.elapsed())
            };
            #[cfg(feature = "tracing")]
            tracing::trace!(
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "rate limiter waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Take a token only if one is available right now.
    pub async fn try_acquire(&self) -> bool {
        if self.config.interval.is_zero() {
            return true;
        }
        let mut bucket = self.state.lock().await;
        self.refill(&mut bucket, Instant::now());
        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        let interval = self.config.interval.as_nanos();
        let elapsed = now.duration_since(bucket.last_refill).as_nanos();
        let earned = elapsed / interval;
        if earned == 0 {
            return;
        }
        let earned_tokens = u32::try_from(earned).unwrap_or(u32::MAX);
        bucket.tokens = bucket
            .tokens
            .saturating_add(earned_tokens)
            .min(self.config.burst);
        if bucket.tokens == self.config.burst {
            // A full bucket does not bank partial progress toward the next token.
            bucket.last_refill = now;
        } else {
            let advance = u64::try_from(earned * interval).unwrap_or(u64::MAX);
            bucket.last_refill += Duration::from_nanos(advance);
        }
    }
}

/// Connector wrapper that takes a limiter token before each request.
pub struct RateLimitedConnector {
    inner: Arc<dyn ExchangeConnector>,
    limiter: Arc<RateLimiter>,
}

impl RateLimitedConnector {
    /// Wrap `inner` with a private limiter.
    pub fn new(inner: Arc<dyn ExchangeConnector>, config: RateLimitConfig) -> Self {
        Self::with_limiter(inner, Arc::new(RateLimiter::new(config)))
    }

    /// Wrap `inner` with a limiter spaced by the connector's own
    /// [`min_request_interval`](ExchangeConnector::min_request_interval).
    pub fn for_connector(inner: Arc<dyn ExchangeConnector>) -> Self {
        let config = RateLimitConfig::every(inner.min_request_interval());
        Self::new(inner, config)
    }

    /// Wrap `inner` with a limiter shared with other wrappers.
    pub fn with_limiter(inner: Arc<dyn ExchangeConnector>, limiter: Arc<RateLimiter>) -> Self {
        Self { inner, limiter }
    }

    /// Access the inner connector.
    pub fn inner(&self) -> &Arc<dyn ExchangeConnector> {
        &self.inner
    }

    /// Access the limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

#[async_trait]
impl ExchangeConnector for RateLimitedConnector {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn vendor(&self) -> &'static str {
        self.inner.vendor()
    }

    fn min_request_interval(&self) -> Duration {
        self.inner.min_request_interval()
    }

    fn milliseconds(&self) -> i64 {
        self.inner.milliseconds()
    }

    fn as_markets_provider(&self) -> Option<&dyn MarketsProvider> {
        self.inner
            .as_markets_provider()
            .map(|_| self as &dyn MarketsProvider)
    }

    fn as_ohlcv_provider(&self) -> Option<&dyn OhlcvProvider> {
        self.inner
            .as_ohlcv_provider()
            .map(|_| self as &dyn OhlcvProvider)
    }
}

#[async_trait]
impl MarketsProvider for RateLimitedConnector {
    async fn load_markets(&self) -> Result<Vec<Market>, HarvestError> {
        let inner = self
            .inner
            .as_markets_provider()
            .ok_or_else(|| HarvestError::unsupported("markets"))?;
        self.limiter.acquire().await;
        inner.load_markets().await
    }
}

#[async_trait]
impl OhlcvProvider for RateLimitedConnector {
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        req: OhlcvRequest,
    ) -> Result<Vec<Candle>, HarvestError> {
        let inner = self
            .inner
            .as_ohlcv_provider()
            .ok_or_else(|| HarvestError::unsupported("ohlcv"))?;
        self.limiter.acquire().await;
        inner.fetch_ohlcv(symbol, req).await
    }

    fn supported_timeframes(&self) -> &'static [Timeframe] {
        self.inner
            .as_ohlcv_provider()
            .map(|p| p.supported_timeframes())
            .unwrap_or_default()
    }
}

/// Middleware config for constructing a [`RateLimitedConnector`].
///
/// Without an explicit config the limiter is spaced by the wrapped connector's
/// minimum request interval.
pub struct RateLimitMiddleware {
    config: Option<RateLimitConfig>,
    shared: Option<Arc<RateLimiter>>,
}

impl RateLimitMiddleware {
    /// Fixed token-bucket parameters.
    #[must_use]
    pub const fn new(config: RateLimitConfig) -> Self {
        Self {
            config: Some(config),
            shared: None,
        }
    }

    /// Derive the interval from the wrapped connector.
    #[must_use]
    pub const fn from_connector() -> Self {
        Self {
            config: None,
            shared: None,
        }
    }

    /// Draw tokens from an existing limiter.
    #[must_use]
    pub fn shared(limiter: Arc<RateLimiter>) -> Self {
        Self {
            config: Some(limiter.config()),
            shared: Some(limiter),
        }
    }

    /// The explicit configuration, if any.
    #[must_use]
    pub const fn config(&self) -> Option<RateLimitConfig> {
        self.config
    }
}

impl Middleware for RateLimitMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn ExchangeConnector>) -> Arc<dyn ExchangeConnector> {
        let wrapped = match (self.shared, self.config) {
            (Some(limiter), _) => RateLimitedConnector::with_limiter(inner, limiter),
            (None, Some(config)) => RateLimitedConnector::new(inner, config),
            (None, None) => RateLimitedConnector::for_connector(inner),
        };
        Arc::new(wrapped)
    }

    fn name(&self) -> &'static str {
        "RateLimitedConnector"
    }

    fn config_json(&self) -> serde_json::Value {
        self.config.map_or_else(
            || serde_json::json!({ "interval_ms": null, "burst": 1 }),
            |c| {
                serde_json::json!({
                    "interval_ms": u64::try_from(c.interval.as_millis()).unwrap_or(u64::MAX),
                    "burst": c.burst,
                })
            },
        )
    }
}
