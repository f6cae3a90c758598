#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use harvest_core::HarvestError;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Production REST endpoint for Binance spot.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

const CONNECTOR: &str = "harvest-binance";

/// One entry of `GET /api/v3/exchangeInfo`'s `symbols` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSymbol {
    /// Exchange-native id, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Trading status, `TRADING` for live markets.
    pub status: String,
    /// Base asset code.
    pub base_asset: String,
    /// Quote asset code.
    pub quote_asset: String,
}

#[derive(Deserialize)]
struct ExchangeInfo {
    symbols: Vec<RawSymbol>,
}

/// One kline row as returned by `GET /api/v3/klines`:
/// `[openTime, "open", "high", "low", "close", "volume", closeTime, ...]`.
pub type RawKline = Vec<serde_json::Value>;

#[derive(Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

/// Market listing abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait BinanceMarkets: Send + Sync {
    /// Fetch every symbol listed on the exchange.
    async fn exchange_info(&self) -> Result<Vec<RawSymbol>, HarvestError>;
}

/// Kline abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait BinanceKlines: Send + Sync {
    /// Fetch up to `limit` klines for `id` opening at or after `start_time`.
    async fn klines(
        &self,
        id: &str,
        interval: &str,
        start_time: i64,
        limit: u16,
    ) -> Result<Vec<RawKline>, HarvestError>;
}

/// Real adapter backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct RealAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl RealAdapter {
    /// Adapter against the production endpoint with a fresh client.
    #[must_use]
    pub fn new_default() -> Self {
        Self::new(reqwest::Client::new(), DEFAULT_BASE_URL)
    }

    /// Wrap an existing client, pointing at `base_url` (e.g. a local mock server).
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<url::Url, HarvestError> {
        let raw = format!("{}{path}", self.base_url);
        url::Url::parse_with_params(&raw, params)
            .map_err(|e| HarvestError::InvalidArg(format!("bad url '{raw}': {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: url::Url,
        context: &str,
    ) -> Result<T, HarvestError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(%url, "binance request");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| map_transport_err(&e, context))?;
        let status = resp.status();
        let retry_after = retry_after_ms(resp.headers());
        let body = resp
            .text()
            .await
            .map_err(|e| map_transport_err(&e, context))?;
        if !status.is_success() {
            return Err(map_status(status, retry_after, &body, context));
        }
        serde_json::from_str(&body)
            .map_err(|e| HarvestError::Data(format!("{context}: unparsable response: {e}")))
    }
}

fn map_transport_err(e: &reqwest::Error, context: &str) -> HarvestError {
    if e.is_timeout() {
        HarvestError::provider_timeout(CONNECTOR, context)
    } else {
        HarvestError::connector(CONNECTOR, format!("{context}: {e}"))
    }
}

fn retry_after_ms(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

fn map_status(
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
    context: &str,
) -> HarvestError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 418 {
        return HarvestError::RateLimitExceeded {
            retry_after_ms: retry_after,
        };
    }
    if status.is_server_error() {
        return HarvestError::connector(CONNECTOR, format!("server error {status}: {context}"));
    }
    match serde_json::from_str::<ApiError>(body) {
        Ok(api) if api.code == -1121 => HarvestError::not_found(context.to_string()),
        Ok(api) => HarvestError::InvalidArg(format!(
            "{context}: rejected with code {}: {}",
            api.code, api.msg
        )),
        Err(_) => HarvestError::connector(CONNECTOR, format!("status {status}: {context}")),
    }
}

#[async_trait]
impl BinanceMarkets for RealAdapter {
    async fn exchange_info(&self) -> Result<Vec<RawSymbol>, HarvestError> {
        let url = self.endpoint("/api/v3/exchangeInfo", &[])?;
        let info: ExchangeInfo = self.get_json(url, "exchange info").await?;
        Ok(info.symbols)
    }
}

#[async_trait]
impl BinanceKlines for RealAdapter {
    async fn klines(
        &self,
        id: &str,
        interval: &str,
        start_time: i64,
        limit: u16,
    ) -> Result<Vec<RawKline>, HarvestError> {
        let url = self.endpoint(
            "/api/v3/klines",
            &[
                ("symbol", id.to_string()),
                ("interval", interval.to_string()),
                ("startTime", start_time.to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        self.get_json(url, &format!("market {id}")).await
    }
}

/* -------- Test-only lightweight adapter constructors ------- */

#[cfg(feature = "test-adapters")]
impl dyn BinanceMarkets {
    /// Build a `BinanceMarkets` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn BinanceMarkets>
    where
        F: Send + Sync + 'static + Fn() -> Result<Vec<RawSymbol>, HarvestError>,
    {
        struct FnMarkets<F>(F);
        #[async_trait]
        impl<F> BinanceMarkets for FnMarkets<F>
        where
            F: Send + Sync + 'static + Fn() -> Result<Vec<RawSymbol>, HarvestError>,
        {
            async fn exchange_info(&self) -> Result<Vec<RawSymbol>, HarvestError> {
                (self.0)()
            }
        }
        Arc::new(FnMarkets(f))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn BinanceKlines {
    /// Build a `BinanceKlines` from a closure taking `(id, interval, start_time, limit)` (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn BinanceKlines>
    where
        F: Send + Sync + 'static + Fn(String, String, i64, u16) -> Result<Vec<RawKline>, HarvestError>,
    {
        struct FnKlines<F>(F);
        #[async_trait]
        impl<F> BinanceKlines for FnKlines<F>
        where
            F: Send
                + Sync
                + 'static
                + Fn(String, String, i64, u16) -> Result<Vec<RawKline>, HarvestError>,
        {
            async fn klines(
                &self,
                id: &str,
                interval: &str,
                start_time: i64,
                limit: u16,
            ) -> Result<Vec<RawKline>, HarvestError> {
                (self.0)(id.to_string(), interval.to_string(), start_time, limit)
            }
        }
        Arc::new(FnKlines(f))
    }
}

/// Hands out shared adapter handles; unimplemented endpoints report `unsupported`.
#[cfg(feature = "test-adapters")]
pub trait CloneArcAdapters {
    /// Clone as `Arc<dyn BinanceMarkets>`.
    fn clone_arc_markets(&self) -> Arc<dyn BinanceMarkets> {
        <dyn BinanceMarkets>::from_fn(|| Err(HarvestError::unsupported("markets")))
    }
    /// Clone as `Arc<dyn BinanceKlines>`.
    fn clone_arc_klines(&self) -> Arc<dyn BinanceKlines> {
        <dyn BinanceKlines>::from_fn(|_, _, _, _| Err(HarvestError::unsupported("ohlcv")))
    }
}

#[cfg(feature = "test-adapters")]
impl CloneArcAdapters for RealAdapter {
    fn clone_arc_markets(&self) -> Arc<dyn BinanceMarkets> {
        Arc::new(self.clone()) as Arc<dyn BinanceMarkets>
    }
    fn clone_arc_klines(&self) -> Arc<dyn BinanceKlines> {
        Arc::new(self.clone()) as Arc<dyn BinanceKlines>
    }
}
