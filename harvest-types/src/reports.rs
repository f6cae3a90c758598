//! Report envelopes produced by the orchestrator.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// One persisted series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    /// Symbol whose history was written.
    pub symbol: Symbol,
    /// Destination file (overwritten on every run).
    pub path: PathBuf,
    /// Number of candle rows written, excluding the header.
    pub rows: usize,
}

/// Summary of a complete harvest run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HarvestReport {
    /// Number of symbols selected for processing.
    pub symbols: usize,
    /// Files written, in processing order.
    pub written: Vec<WrittenFile>,
    /// Symbols for which the exchange returned no candles at all.
    pub empty: Vec<Symbol>,
}

impl HarvestReport {
    /// Total candle rows written across all files.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.written.iter().map(|w| w.rows).sum()
    }
}
