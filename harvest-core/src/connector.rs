use std::time::Duration;

use async_trait::async_trait;

use crate::types::{Candle, HarvestError, Market, OhlcvRequest, Symbol, Timeframe};

/// Focused role trait for connectors that list tradable markets.
#[async_trait]
pub trait MarketsProvider: Send + Sync {
    /// Load the exchange's market metadata, in listing order.
    async fn load_markets(&self) -> Result<Vec<Market>, HarvestError>;
}

/// Focused role trait for connectors that serve paginated OHLCV history.
#[async_trait]
pub trait OhlcvProvider: Send + Sync {
    /// Fetch up to `req.limit` candles with open time at or after `req.since`.
    ///
    /// An empty vector means the exchange holds no candles from `since` onward.
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        req: OhlcvRequest,
    ) -> Result<Vec<Candle>, HarvestError>;

    /// Timeframes this connector can natively serve.
    fn supported_timeframes(&self) -> &'static [Timeframe] {
        Timeframe::ALL
    }
}

/// Exchange client interface.
///
/// A connector advertises each capability it implements through the `as_*`
/// accessors; middleware wraps a connector and re-advertises only what the
/// inner connector supports.
#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    /// A stable identifier used in logs and errors (e.g. "harvest-binance").
    fn name(&self) -> &'static str;

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Minimum spacing between requests mandated by the exchange.
    fn min_request_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    /// Current exchange time in milliseconds since the Unix epoch.
    fn milliseconds(&self) -> i64 {
        crate::time::now_millis()
    }

    /// If implemented, returns a trait object for market listing.
    fn as_markets_provider(&self) -> Option<&dyn MarketsProvider> {
        None
    }

    /// If implemented, returns a trait object for OHLCV pagination.
    fn as_ohlcv_provider(&self) -> Option<&dyn OhlcvProvider> {
        None
    }
}
