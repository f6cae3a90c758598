use harvest_core::{Market, Symbol};

use crate::MOCK_NOW_MS;

const DAY_MS: i64 = 86_400_000;

/// `(symbol, exchange id, listing time)` for every fixture market, in listing order.
const LISTINGS: &[(&str, &str, i64)] = &[
    ("BTC/USDT", "BTCUSDT", MOCK_NOW_MS - 3 * DAY_MS),
    ("ETH/BTC", "ETHBTC", MOCK_NOW_MS - 3 * DAY_MS),
    ("ETH/USDT", "ETHUSDT", MOCK_NOW_MS - DAY_MS),
    ("BTC/USDT:USDT", "BTCUSDT_PERP", MOCK_NOW_MS - 3 * DAY_MS),
    // Listed at "now": no closed candles yet.
    ("NEW/USDT", "NEWUSDT", MOCK_NOW_MS),
];

pub fn all() -> Vec<Market> {
    LISTINGS
        .iter()
        .filter_map(|(sym, id, _)| {
            Symbol::new(*sym).ok().map(|symbol| Market {
                symbol,
                id: (*id).to_string(),
                active: true,
            })
        })
        .collect()
}

pub fn listed_at(symbol: &Symbol) -> Option<i64> {
    LISTINGS
        .iter()
        .find(|(s, _, _)| *s == symbol.as_str())
        .map(|(_, _, t)| *t)
}
