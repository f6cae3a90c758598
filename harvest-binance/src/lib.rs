//! harvest-binance
//!
//! Public connector that implements `ExchangeConnector` on top of the Binance
//! spot REST API. Exposes market listing (`exchangeInfo`) and paginated
//! klines.
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;
mod builder;

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "test-adapters")]
use adapter::CloneArcAdapters;
use adapter::{BinanceKlines, BinanceMarkets, RawKline, RawSymbol, RealAdapter};
use async_trait::async_trait;
use harvest_core::connector::{ExchangeConnector, MarketsProvider, OhlcvProvider};
use harvest_core::{Candle, Decimal, HarvestError, Market, OhlcvRequest, Symbol, Timeframe};
use tokio::sync::RwLock;

pub use builder::BinanceConnectorBuilder;

#[cfg(not(feature = "test-adapters"))]
type AdapterArc = Arc<RealAdapter>;

#[cfg(feature = "test-adapters")]
type MarketsAdapter = Arc<dyn BinanceMarkets>;
#[cfg(not(feature = "test-adapters"))]
type MarketsAdapter = AdapterArc;

#[cfg(feature = "test-adapters")]
type KlinesAdapter = Arc<dyn BinanceKlines>;
#[cfg(not(feature = "test-adapters"))]
type KlinesAdapter = AdapterArc;

/// Binance's hard cap on klines per request.
const MAX_KLINES_PER_REQUEST: u16 = 1000;

/// Public connector type. Production users construct it through
/// [`BinanceConnector::rate_limited`] or [`BinanceConnector::new_default`].
pub struct BinanceConnector {
    markets: MarketsAdapter,
    klines: KlinesAdapter,
    /// Unified symbol -> exchange id, filled by `load_markets`.
    ids: RwLock<HashMap<Symbol, String>>,
}

impl BinanceConnector {
    /// Stable connector name.
    pub const NAME: &'static str = "harvest-binance";

    /// Minimum spacing between requests on the public spot API.
    pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(50);

    fn looks_like_not_found(msg: &str) -> bool {
        let m = msg.to_ascii_lowercase();
        m.contains("invalid symbol") || m.contains("not found")
    }

    fn normalize_error(e: HarvestError, what: &str) -> HarvestError {
        match e {
            HarvestError::Connector { connector: _, msg } => {
                if Self::looks_like_not_found(&msg) {
                    HarvestError::not_found(what.to_string())
                } else {
                    HarvestError::connector(Self::NAME, msg)
                }
            }
            HarvestError::Other(msg) => HarvestError::connector(Self::NAME, msg),
            other => other,
        }
    }

    /// Build against the production endpoint with a fresh HTTP client.
    #[must_use]
    pub fn new_default() -> Self {
        let a = RealAdapter::new_default();
        Self::from_adapter(&a)
    }

    /// Build from a provided `reqwest::Client` and base URL.
    #[must_use]
    pub fn new_with_client(http: reqwest::Client, base_url: &str) -> Self {
        let a = RealAdapter::new(http, base_url);
        Self::from_adapter(&a)
    }

    /// Build against another base URL (e.g. a local mock server).
    ///
    /// # Errors
    /// Returns `InvalidArg` if `base_url` is not an absolute URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, HarvestError> {
        url::Url::parse(base_url)
            .map_err(|e| HarvestError::InvalidArg(format!("bad base url '{base_url}': {e}")))?;
        Ok(Self::new_with_client(reqwest::Client::new(), base_url))
    }

    /// For tests/injection (requires the `test-adapters` feature).
    #[cfg(feature = "test-adapters")]
    pub fn from_adapter<A: CloneArcAdapters + 'static>(adapter: &A) -> Self {
        Self {
            markets: adapter.clone_arc_markets(),
            klines: adapter.clone_arc_klines(),
            ids: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(not(feature = "test-adapters"))]
    /// Build from a concrete `RealAdapter` by cloning it into shared handles.
    pub fn from_adapter(adapter: &RealAdapter) -> Self {
        let shared = Arc::new(adapter.clone());
        Self {
            markets: Arc::clone(&shared),
            klines: shared,
            ids: RwLock::new(HashMap::new()),
        }
    }

    /// Exchange id for `symbol`: the id seen in the last market listing, or the
    /// concatenated assets when markets were never loaded.
    async fn market_id(&self, symbol: &Symbol) -> String {
        if let Some(id) = self.ids.read().await.get(symbol) {
            return id.clone();
        }
        format!("{}{}", symbol.base(), symbol.quote())
    }
}

fn market_from_raw(raw: RawSymbol) -> Option<Market> {
    let symbol = Symbol::from_parts(&raw.base_asset, &raw.quote_asset).ok()?;
    Some(Market {
        symbol,
        active: raw.status == "TRADING",
        id: raw.symbol,
    })
}

fn decimal_at(row: &RawKline, idx: usize, field: &str) -> Result<Decimal, HarvestError> {
    let raw = row
        .get(idx)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| HarvestError::Data(format!("kline missing {field}")))?;
    Decimal::from_str(raw).map_err(|e| HarvestError::Data(format!("kline {field} '{raw}': {e}")))
}

fn candle_from_raw(row: &RawKline) -> Result<Candle, HarvestError> {
    let open_time = row
        .first()
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| HarvestError::Data("kline missing open time".into()))?;
    Ok(Candle::new(
        open_time,
        decimal_at(row, 1, "open")?,
        decimal_at(row, 2, "high")?,
        decimal_at(row, 3, "low")?,
        decimal_at(row, 4, "close")?,
        decimal_at(row, 5, "volume")?,
    ))
}

#[async_trait]
impl ExchangeConnector for BinanceConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "Binance"
    }

    fn min_request_interval(&self) -> Duration {
        Self::MIN_REQUEST_INTERVAL
    }

    fn as_markets_provider(&self) -> Option<&dyn MarketsProvider> {
        Some(self as &dyn MarketsProvider)
    }

    fn as_ohlcv_provider(&self) -> Option<&dyn OhlcvProvider> {
        Some(self as &dyn OhlcvProvider)
    }
}

#[async_trait]
impl MarketsProvider for BinanceConnector {
    async fn load_markets(&self) -> Result<Vec<Market>, HarvestError> {
        let raw = self
            .markets
            .exchange_info()
            .await
            .map_err(|e| Self::normalize_error(e, "exchange info"))?;
        let markets: Vec<Market> = raw.into_iter().filter_map(market_from_raw).collect();
        let mut ids = self.ids.write().await;
        ids.clear();
        ids.extend(markets.iter().map(|m| (m.symbol.clone(), m.id.clone())));
        drop(ids);
        #[cfg(feature = "tracing")]
        tracing::debug!(count = markets.len(), "loaded binance markets");
        Ok(markets)
    }
}

#[async_trait]
impl OhlcvProvider for BinanceConnector {
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        req: OhlcvRequest,
    ) -> Result<Vec<Candle>, HarvestError> {
        if req.limit == 0 || req.limit > MAX_KLINES_PER_REQUEST {
            return Err(HarvestError::InvalidArg(format!(
                "limit must be within 1..={MAX_KLINES_PER_REQUEST}, got {}",
                req.limit
            )));
        }
        let id = self.market_id(symbol).await;
        let rows = self
            .klines
            .klines(&id, req.timeframe.as_str(), req.since, req.limit)
            .await
            .map_err(|e| match Self::normalize_error(e, &format!("market {symbol}")) {
                HarvestError::InvalidArg(msg) => {
                    HarvestError::InvalidArg(format!("market {symbol}: {msg}"))
                }
                other => other,
            })
            .inspect_err(|e| {
                if !e.is_transient() {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(%symbol, error = %e, "binance rejected klines request");
                }
            })?;
        rows.iter().map(candle_from_raw).collect()
    }

    fn supported_timeframes(&self) -> &'static [Timeframe] {
        Timeframe::ALL
    }
}
