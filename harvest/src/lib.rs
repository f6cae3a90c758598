//! Harvest downloads the full candlestick history of every market quoted in one
//! currency and writes one CSV file per market.
//!
//! Overview
//! - Enumerates markets through any connector implementing the `harvest_core`
//!   contracts and keeps the pairs quoted in the configured currency (USDT by default).
//! - Pages through each symbol's history from a fixed lookback horizon up to the
//!   exchange clock captured at the start of the symbol, advancing the cursor one
//!   interval past the last candle of each page.
//! - Retries transient failures according to a [`RetryPolicy`] (unbounded, fixed
//!   60 s by default) so a flaky network never leaves holes in a series.
//! - Persists each non-empty series as `<base>_<quote>.csv`, overwriting any
//!   previous file.
//!
//! Symbols are processed strictly one after another; an error that escapes the
//! retry policy aborts the run.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use harvest::Harvester;
//! use harvest_binance::BinanceConnector;
//!
//! let harvester = Harvester::builder()
//!     .with_connector(BinanceConnector::rate_limited().build())
//!     .output_dir("data")
//!     .build()?;
//! let report = harvester.run().await?;
//! println!("{} files, {} rows", report.written.len(), report.total_rows());
//! ```

/// Retry delay schedule with jitter.
pub mod backoff;
mod core;
mod paginate;
mod run;
mod writer;

pub use crate::core::{Harvester, HarvesterBuilder};
pub use crate::paginate::Cursor;
pub use crate::writer::{file_name_for, write_series};

pub use harvest_core::{
    BackoffConfig, Candle, HarvestConfig, HarvestError, HarvestReport, RateLimitConfig,
    RetryPolicy, Series, Symbol, Timeframe, WrittenFile,
};
