use crate::types::{Candle, Timeframe};

/// Pagination cursor after a fetched page: one interval past the last candle.
///
/// Returns `None` for an empty page; the caller treats that as end-of-data and
/// leaves its cursor where it was.
#[must_use]
pub fn next_since(page: &[Candle], timeframe: Timeframe) -> Option<i64> {
    page.last()
        .map(|c| c.open_time.saturating_add(timeframe.as_millis()))
}

/// True when every open time is strictly greater than its predecessor.
#[must_use]
pub fn is_strictly_increasing(candles: &[Candle]) -> bool {
    candles.windows(2).all(|w| w[0].open_time < w[1].open_time)
}

/// Holes in the series: `(previous_open_time, next_open_time)` pairs whose
/// spacing is larger than one timeframe interval.
#[must_use]
pub fn find_gaps(candles: &[Candle], timeframe: Timeframe) -> Vec<(i64, i64)> {
    let step = timeframe.as_millis();
    candles
        .windows(2)
        .filter(|w| w[1].open_time - w[0].open_time > step)
        .map(|w| (w[0].open_time, w[1].open_time))
        .collect()
}
