//! Unified `BASE/QUOTE` market symbols.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HarvestError;

/// A unified market symbol of the form `BASE/QUOTE`.
///
/// Derivative listings carry a settlement suffix (`BTC/USDT:USDT`); it is kept
/// as part of the quote segment so such symbols never compare equal to the spot
/// pair and never end with `/USDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Validate and wrap a unified symbol.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the input has no `/` separator or an empty side.
    pub fn new(raw: impl Into<String>) -> Result<Self, HarvestError> {
        let raw = raw.into();
        match raw.split_once('/') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => Ok(Self(raw)),
            _ => Err(HarvestError::InvalidArg(format!(
                "symbol '{raw}' is not of the form BASE/QUOTE"
            ))),
        }
    }

    /// Build from separate base and quote assets.
    ///
    /// # Errors
    /// Returns `InvalidArg` when either side is empty.
    pub fn from_parts(base: &str, quote: &str) -> Result<Self, HarvestError> {
        Self::new(format!("{base}/{quote}"))
    }

    /// The full unified string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base asset (left of `/`).
    #[must_use]
    pub fn base(&self) -> &str {
        self.0.split_once('/').map_or("", |(b, _)| b)
    }

    /// Quote segment (right of `/`, including any settlement suffix).
    #[must_use]
    pub fn quote(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, q)| q)
    }

    /// True when the symbol ends with `/<quote>`.
    #[must_use]
    pub fn is_quoted_in(&self, quote: &str) -> bool {
        self.0
            .strip_suffix(quote)
            .is_some_and(|rest| rest.ends_with('/'))
    }

    /// Lower-cased, filesystem-friendly stem: `BTC/USDT` becomes `btc_usdt`.
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.0.to_lowercase().replace('/', "_")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = HarvestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
