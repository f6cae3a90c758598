//! Configuration types shared across the orchestrator and connectors.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timeframe::Timeframe;

/// Ten years of history, matching the exchange's earliest listings with margin.
const DEFAULT_LOOKBACK_DAYS: u64 = 365 * 10;
/// Binance's maximum page size for kline requests.
const DEFAULT_PAGE_LIMIT: u16 = 1000;
/// Fixed pause after a failed fetch.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Exponential backoff configuration between retries of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delay before the first retry in milliseconds.
    pub min_backoff_ms: u64,
    /// Upper bound for any single delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor applied after each failure (>= 1; 1 keeps the delay fixed).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl BackoffConfig {
    /// A constant delay with no growth and no jitter.
    #[must_use]
    pub const fn fixed(delay: Duration) -> Self {
        let ms = delay.as_millis();
        let ms = if ms > u64::MAX as u128 {
            u64::MAX
        } else {
            ms as u64
        };
        Self {
            min_backoff_ms: ms,
            max_backoff_ms: ms,
            factor: 1,
            jitter_percent: 0,
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff_ms: 500,
            max_backoff_ms: 60_000,
            factor: 2,
            jitter_percent: 20,
        }
    }
}

/// How failed exchange requests are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts allowed per request, including the first; `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Delay schedule between attempts.
    pub backoff: BackoffConfig,
}

impl RetryPolicy {
    /// Retry forever with a constant delay.
    #[must_use]
    pub const fn unbounded_fixed(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            backoff: BackoffConfig::fixed(delay),
        }
    }

    /// Give up after `max_attempts` attempts, waiting per `backoff` in between.
    #[must_use]
    pub const fn bounded(max_attempts: u32, backoff: BackoffConfig) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            backoff,
        }
    }

    /// True when another attempt is allowed after `attempts_made` attempts.
    #[must_use]
    pub const fn allows_another(&self, attempts_made: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts_made < max,
            None => true,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded_fixed(DEFAULT_RETRY_DELAY)
    }
}

/// Token-bucket parameters for spacing exchange requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// One token is refilled every `interval`.
    pub interval: Duration,
    /// Maximum number of tokens held at once (>= 1).
    pub burst: u32,
}

impl RateLimitConfig {
    /// One request per `interval`, no bursting.
    #[must_use]
    pub const fn every(interval: Duration) -> Self {
        Self { interval, burst: 1 }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::every(Duration::from_secs(1))
    }
}

/// Global configuration for a harvest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Candle interval requested from the exchange.
    pub timeframe: Timeframe,
    /// Maximum candles per page request.
    pub limit: u16,
    /// How far back from "now" each symbol's history starts.
    pub lookback: Duration,
    /// Quote currency selecting which markets are harvested.
    pub quote: String,
    /// Directory receiving one CSV file per symbol.
    pub output_dir: PathBuf,
    /// Retry behavior for failed page requests.
    pub retry: RetryPolicy,
    /// Optional timeout around each individual exchange call.
    pub provider_timeout: Option<Duration>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::M15,
            limit: DEFAULT_PAGE_LIMIT,
            lookback: Duration::from_secs(DEFAULT_LOOKBACK_DAYS * 24 * 60 * 60),
            quote: "USDT".to_string(),
            output_dir: PathBuf::from("."),
            retry: RetryPolicy::default(),
            provider_timeout: None,
        }
    }
}
