//! Deterministic exchange connectors for tests.
//!
//! [`MockExchange`] serves a small fixed market listing with synthetic candles
//! and a frozen clock. [`DynamicMockConnector`] defers every call to a test
//! controller.

use std::time::Duration;

use async_trait::async_trait;
use harvest_core::connector::{ExchangeConnector, MarketsProvider, OhlcvProvider};
use harvest_core::{Candle, HarvestError, Market, OhlcvRequest, Symbol, Timeframe};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};

/// Frozen "now" reported by the mock connectors (2023-11-14 22:13:20 UTC).
pub const MOCK_NOW_MS: i64 = 1_700_000_000_000;

/// `count` synthetic candles spaced one `timeframe` apart, starting at `start_ms`.
#[must_use]
pub fn candle_run(start_ms: i64, count: usize, timeframe: Timeframe) -> Vec<Candle> {
    fixtures::candles::run(start_ms, count, timeframe)
}

/// Mock connector with fixture markets and candles.
///
/// Markets: `BTC/USDT` (3 days of history), `ETH/BTC`, `ETH/USDT` (1 day),
/// the derivative `BTC/USDT:USDT`, and `NEW/USDT` with no history. Requests for
/// `FAIL/USDT` fail with a transient connector error; unknown symbols are
/// `NotFound`.
pub struct MockExchange;

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExchange {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExchangeConnector for MockExchange {
    fn name(&self) -> &'static str {
        "harvest-mock"
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn min_request_interval(&self) -> Duration {
        Duration::from_millis(50)
    }

    fn milliseconds(&self) -> i64 {
        MOCK_NOW_MS
    }

    fn as_markets_provider(&self) -> Option<&dyn MarketsProvider> {
        Some(self as &dyn MarketsProvider)
    }

    fn as_ohlcv_provider(&self) -> Option<&dyn OhlcvProvider> {
        Some(self as &dyn OhlcvProvider)
    }
}

#[async_trait]
impl MarketsProvider for MockExchange {
    async fn load_markets(&self) -> Result<Vec<Market>, HarvestError> {
        Ok(fixtures::markets::all())
    }
}

#[async_trait]
impl OhlcvProvider for MockExchange {
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        req: OhlcvRequest,
    ) -> Result<Vec<Candle>, HarvestError> {
        if symbol.base() == "FAIL" {
            return Err(HarvestError::connector(
                "harvest-mock",
                "forced failure: ohlcv",
            ));
        }
        let listed_at = fixtures::markets::listed_at(symbol)
            .ok_or_else(|| HarvestError::not_found(format!("market {symbol}")))?;
        Ok(fixtures::candles::page(listed_at, MOCK_NOW_MS, req))
    }
}
