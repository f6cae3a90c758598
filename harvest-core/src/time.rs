use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::HarvestError;

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse an ISO-8601 / RFC 3339 timestamp into epoch milliseconds.
///
/// # Errors
/// Returns `InvalidArg` if the input is not a valid timestamp.
pub fn parse8601(s: &str) -> Result<i64, HarvestError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| HarvestError::InvalidArg(format!("invalid ISO-8601 timestamp '{s}': {e}")))
}

/// Render epoch milliseconds as ISO-8601 with second precision (`2015-01-01T00:00:00Z`).
///
/// # Errors
/// Returns `InvalidArg` if the timestamp is outside chrono's representable range.
pub fn iso8601(ms: i64) -> Result<String, HarvestError> {
    to_datetime(ms).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Human-readable UTC rendering used in output files (`2017-08-17 04:00:00`).
///
/// Fractional seconds appear only when the timestamp carries them.
///
/// # Errors
/// Returns `InvalidArg` if the timestamp is outside chrono's representable range.
pub fn format_timestamp(ms: i64) -> Result<String, HarvestError> {
    to_datetime(ms).map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
}

/// Start of the history window: `now_ms - lookback`, truncated to a whole second.
///
/// The value passes through its ISO-8601 form so it matches what an exchange
/// would compute from the same textual start date.
///
/// # Errors
/// Returns `InvalidArg` if the lookback is too large to represent.
pub fn lookback_start(now_ms: i64, lookback: Duration) -> Result<i64, HarvestError> {
    let lookback_ms = i64::try_from(lookback.as_millis())
        .map_err(|_| HarvestError::InvalidArg("lookback too large".into()))?;
    let start = now_ms
        .checked_sub(lookback_ms)
        .ok_or_else(|| HarvestError::InvalidArg("lookback too large".into()))?;
    parse8601(&iso8601(start)?)
}

fn to_datetime(ms: i64) -> Result<DateTime<Utc>, HarvestError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| HarvestError::InvalidArg(format!("timestamp {ms} out of range")))
}
