//! Pagination driver: turns a lookback window into a complete series.

use std::future::Future;

use harvest_core::connector::OhlcvProvider;
use harvest_core::time::lookback_start;
use harvest_core::{Candle, HarvestError, OhlcvRequest, Series, Symbol, Timeframe, next_since};

use crate::Harvester;
use crate::backoff::Backoff;

/// Position of the pagination loop inside `[since, now)`.
///
/// `now` is fixed when the cursor is created; `since` only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    since: i64,
    now: i64,
}

impl Cursor {
    #[must_use]
    pub const fn new(since: i64, now: i64) -> Self {
        Self { since, now }
    }

    /// Open time requested by the next page.
    #[must_use]
    pub const fn since(&self) -> i64 {
        self.since
    }

    /// Upper bound captured at creation.
    #[must_use]
    pub const fn now(&self) -> i64 {
        self.now
    }

    /// True once the window has been covered.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.since >= self.now
    }

    /// Move past a fetched page. Returns `false` (and stays put) for an empty page.
    pub fn advance(&mut self, page: &[Candle], timeframe: Timeframe) -> bool {
        match next_since(page, timeframe) {
            Some(next) => {
                self.since = next;
                true
            }
            None => false,
        }
    }
}

impl Harvester {
    /// Download the complete series for `symbol`.
    ///
    /// The exchange clock is read once; the window starts `lookback` before it,
    /// truncated to a whole second.
    ///
    /// # Errors
    /// Returns the first non-transient error, or `RetriesExhausted` when a
    /// bounded retry policy gives up.
    pub async fn fetch_series(&self, symbol: &Symbol) -> Result<Series, HarvestError> {
        let now = self.connector.milliseconds();
        let since = lookback_start(now, self.cfg.lookback)?;
        self.fetch_series_between(symbol, Cursor::new(since, now))
            .await
    }

    /// Download `symbol` from `cursor.since()` up to `cursor.now()`.
    ///
    /// # Errors
    /// Same as [`fetch_series`](Self::fetch_series).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "harvest::paginate::fetch_series",
            skip(self, cursor),
            fields(symbol = %symbol, since = cursor.since(), now = cursor.now()),
        )
    )]
    pub async fn fetch_series_between(
        &self,
        symbol: &Symbol,
        mut cursor: Cursor,
    ) -> Result<Series, HarvestError> {
        let provider = self
            .connector
            .as_ohlcv_provider()
            .ok_or_else(|| HarvestError::unsupported("ohlcv"))?;
        let timeframe = self.cfg.timeframe;
        let mut series = Series::new(symbol.clone(), timeframe);

        while !cursor.is_exhausted() {
            let req = OhlcvRequest {
                timeframe,
                since: cursor.since(),
                limit: self.cfg.limit,
            };
            let page = self.fetch_page(provider, symbol, req).await?;
            if !cursor.advance(&page, timeframe) {
                break;
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(
                symbol = %symbol,
                since = req.since,
                fetched = page.len(),
                "fetched page"
            );
            series.extend_page(page);
        }
        Ok(series)
    }

    async fn fetch_page(
        &self,
        provider: &dyn OhlcvProvider,
        symbol: &Symbol,
        req: OhlcvRequest,
    ) -> Result<Vec<Candle>, HarvestError> {
        self.with_retry("ohlcv", move || {
            self.provider_call("ohlcv", provider.fetch_ohlcv(symbol, req))
        })
        .await
    }

    /// Run `call` until it succeeds, fails non-transiently, or the retry
    /// policy gives up. Each retry repeats the identical request.
    pub(crate) async fn with_retry<T, F, Fut>(
        &self,
        capability: &'static str,
        mut call: F,
    ) -> Result<T, HarvestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, HarvestError>>,
    {
        let policy = self.cfg.retry;
        let mut backoff = Backoff::new(policy.backoff);
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            let err = match call().await {
                Ok(v) => return Ok(v),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => e,
            };
            if !policy.allows_another(attempts) {
                return Err(HarvestError::RetriesExhausted {
                    attempts,
                    last: Box::new(err),
                });
            }
            let delay = backoff.next_delay(err.retry_after_ms());
            #[cfg(feature = "tracing")]
            tracing::warn!(
                capability,
                attempt = attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "request failed, retrying"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = capability;
            tokio::time::sleep(delay).await;
        }
    }
}
