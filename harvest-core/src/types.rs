//! Domain types for candles, markets and series, plus re-exports from `harvest-types`.

pub use harvest_types::{
    BackoffConfig, HarvestConfig, HarvestError, HarvestReport, RateLimitConfig, RetryPolicy,
    Symbol, Timeframe, WrittenFile,
};
pub use rust_decimal::Decimal;

use serde::{Deserialize, Serialize};

/// One OHLCV record for a single timeframe interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Interval open time in milliseconds since the Unix epoch (UTC).
    pub open_time: i64,
    /// First traded price in the interval.
    pub open: Decimal,
    /// Highest traded price.
    pub high: Decimal,
    /// Lowest traded price.
    pub low: Decimal,
    /// Last traded price.
    pub close: Decimal,
    /// Traded base-asset volume.
    pub volume: Decimal,
}

impl Candle {
    /// Construct a candle from its six fields.
    #[must_use]
    pub const fn new(
        open_time: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// A tradable market as listed by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Unified `BASE/QUOTE` symbol.
    pub symbol: Symbol,
    /// Exchange-native identifier (e.g. `BTCUSDT`).
    pub id: String,
    /// Whether the exchange currently reports the market as trading.
    pub active: bool,
}

/// Parameters of a single page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OhlcvRequest {
    /// Candle interval.
    pub timeframe: Timeframe,
    /// Earliest candle open time to return, in milliseconds.
    pub since: i64,
    /// Maximum number of candles to return.
    pub limit: u16,
}

/// Ordered candles for one symbol, accumulated page by page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Symbol the candles belong to.
    pub symbol: Symbol,
    /// Interval of every candle.
    pub timeframe: Timeframe,
    /// Candles in the order they were received.
    pub candles: Vec<Candle>,
}

impl Series {
    /// Create an empty series.
    #[must_use]
    pub const fn new(symbol: Symbol, timeframe: Timeframe) -> Self {
        Self {
            symbol,
            timeframe,
            candles: Vec::new(),
        }
    }

    /// Append a fetched page.
    pub fn extend_page(&mut self, page: Vec<Candle>) {
        self.candles.extend(page);
    }

    /// Number of candles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// True when no candle has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Earliest-received candle.
    #[must_use]
    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    /// Latest-received candle.
    #[must_use]
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Stable sort by open time; equal timestamps keep arrival order.
    pub fn sort_by_time(&mut self) {
        self.candles.sort_by_key(|c| c.open_time);
    }
}
