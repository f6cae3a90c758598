//! harvest-core
//!
//! Core types, traits, and utilities shared across the harvest workspace.
//!
//! - `types`: candles, markets, series and page requests.
//! - `connector`: the `ExchangeConnector` trait and its capability provider traits.
//! - `markets`: selection of the markets to harvest.
//! - `time`: millisecond timestamps and ISO-8601 conversion.
//! - `timeseries`: pagination cursor arithmetic and series invariants.
#![warn(missing_docs)]

/// Connector capability traits and the primary `ExchangeConnector` interface.
pub mod connector;
/// Market filtering (the symbol enumerator).
pub mod markets;
/// Middleware trait implemented by connector wrappers.
pub mod middleware;
/// Millisecond clock and ISO-8601 helpers.
pub mod time;
/// Cursor arithmetic and ordering checks for candle series.
pub mod timeseries;
pub mod types;

pub use connector::ExchangeConnector;
pub use markets::{pairs_quoted_in, usdt_pairs};
pub use middleware::Middleware;
pub use timeseries::{find_gaps, is_strictly_increasing, next_since};
pub use types::*;
