use crate::types::{Market, Symbol};

/// Symbols of all markets quoted in `quote`, in listing order.
///
/// A symbol qualifies when it ends with `/<quote>`; derivative listings such as
/// `BTC/USDT:USDT` do not.
#[must_use]
pub fn pairs_quoted_in(markets: &[Market], quote: &str) -> Vec<Symbol> {
    markets
        .iter()
        .filter(|m| m.symbol.is_quoted_in(quote))
        .map(|m| m.symbol.clone())
        .collect()
}

/// Symbols of all USDT-quoted markets, in listing order.
#[must_use]
pub fn usdt_pairs(markets: &[Market]) -> Vec<Symbol> {
    pairs_quoted_in(markets, "USDT")
}
