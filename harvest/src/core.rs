use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use harvest_core::connector::ExchangeConnector;
use harvest_core::{HarvestConfig, HarvestError, RateLimitConfig, RetryPolicy, Timeframe};
use harvest_middleware::ConnectorBuilder;

/// Orchestrator driving one exchange connector through a full harvest.
pub struct Harvester {
    pub(crate) connector: Arc<dyn ExchangeConnector>,
    pub(crate) cfg: HarvestConfig,
}

/// Builder for [`Harvester`].
pub struct HarvesterBuilder {
    connector: Option<Arc<dyn ExchangeConnector>>,
    rate_limit: Option<RateLimitConfig>,
    cfg: HarvestConfig,
}

impl Default for HarvesterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HarvesterBuilder {
    /// Create a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connector: None,
            rate_limit: None,
            cfg: HarvestConfig::default(),
        }
    }

    /// Set the exchange connector. A second call replaces the first.
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn ExchangeConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: HarvestConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Candle interval to download.
    #[must_use]
    pub const fn timeframe(mut self, timeframe: Timeframe) -> Self {
        self.cfg.timeframe = timeframe;
        self
    }

    /// Maximum candles per page request.
    #[must_use]
    pub const fn limit(mut self, limit: u16) -> Self {
        self.cfg.limit = limit;
        self
    }

    /// How far back from the exchange clock each symbol's history starts.
    #[must_use]
    pub const fn lookback(mut self, lookback: Duration) -> Self {
        self.cfg.lookback = lookback;
        self
    }

    /// Quote currency selecting which markets are harvested.
    #[must_use]
    pub fn quote(mut self, quote: impl Into<String>) -> Self {
        self.cfg.quote = quote.into();
        self
    }

    /// Directory receiving the CSV files. Created on first write if missing.
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.output_dir = dir.into();
        self
    }

    /// Retry policy for failed exchange requests.
    ///
    /// Behavior and trade-offs:
    /// - The default retries forever with a fixed 60 s pause, so a run never
    ///   loses data to a transient outage but can stall indefinitely.
    /// - A bounded policy turns a persistent outage into `RetriesExhausted`,
    ///   which aborts the run.
    #[must_use]
    pub const fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.cfg.retry = policy;
        self
    }

    /// Bound each individual exchange call. A timed-out call counts as a
    /// transient failure and goes through the retry policy.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = Some(timeout);
        self
    }

    /// Wrap the connector in a token-bucket limiter at build time.
    ///
    /// Leave unset when the connector is already rate limited (for example one
    /// built through `BinanceConnector::rate_limited()`).
    #[must_use]
    pub const fn rate_limit(mut self, cfg: RateLimitConfig) -> Self {
        self.rate_limit = Some(cfg);
        self
    }

    /// Build the `Harvester`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no connector was provided, the page limit is
    /// zero, or the quote currency is empty; `Unsupported` if the connector
    /// cannot serve OHLCV history in the configured timeframe.
    pub fn build(self) -> Result<Harvester, HarvestError> {
        let raw = self.connector.ok_or_else(|| {
            HarvestError::InvalidArg(
                "no connector registered; add one via with_connector(...)".to_string(),
            )
        })?;
        if self.cfg.limit == 0 {
            return Err(HarvestError::InvalidArg("page limit must be positive".into()));
        }
        if self.cfg.quote.is_empty() {
            return Err(HarvestError::InvalidArg("quote currency must not be empty".into()));
        }
        let ohlcv = raw
            .as_ohlcv_provider()
            .ok_or_else(|| HarvestError::unsupported("ohlcv"))?;
        if !ohlcv.supported_timeframes().contains(&self.cfg.timeframe) {
            return Err(HarvestError::unsupported(format!(
                "ohlcv/{}",
                self.cfg.timeframe
            )));
        }

        let connector = match self.rate_limit {
            Some(rl) => ConnectorBuilder::new(raw).with_rate_limit(rl).build(),
            None => raw,
        };
        Ok(Harvester {
            connector,
            cfg: self.cfg,
        })
    }
}

impl Harvester {
    /// Start building a new `Harvester`.
    #[must_use]
    pub fn builder() -> HarvesterBuilder {
        HarvesterBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &HarvestConfig {
        &self.cfg
    }

    /// The (possibly wrapped) connector requests go through.
    #[must_use]
    pub const fn connector(&self) -> &Arc<dyn ExchangeConnector> {
        &self.connector
    }

    /// Wrap a provider future with the configured timeout, if any.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "harvest::core::provider_call",
            skip(self, fut),
            fields(connector = self.connector.name(), capability = capability),
        )
    )]
    pub(crate) async fn provider_call<T, Fut>(
        &self,
        capability: &'static str,
        fut: Fut,
    ) -> Result<T, HarvestError>
    where
        Fut: std::future::Future<Output = Result<T, HarvestError>>,
    {
        match self.cfg.provider_timeout {
            Some(timeout) => (tokio::time::timeout(timeout, fut).await).unwrap_or_else(|_| {
                Err(HarvestError::provider_timeout(
                    self.connector.name(),
                    capability,
                ))
            }),
            None => fut.await,
        }
    }
}
