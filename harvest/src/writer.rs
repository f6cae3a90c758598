//! Persistence writer: one CSV file per symbol.

use std::path::{Path, PathBuf};

use harvest_core::time::format_timestamp;
use harvest_core::{HarvestError, Series, Symbol, WrittenFile};

const HEADER: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

/// Output file name for `symbol`: `BTC/USDT` becomes `btc_usdt.csv`.
#[must_use]
pub fn file_name_for(symbol: &Symbol) -> String {
    format!("{}.csv", symbol.file_stem())
}

/// Write `series` to `<dir>/<base>_<quote>.csv`, replacing any existing file.
///
/// Candles are sorted by open time first (stable, duplicates kept). An empty
/// series writes nothing and returns `Ok(None)`.
///
/// # Errors
/// Returns `Io` if the directory or file cannot be written and `InvalidArg` if
/// a timestamp cannot be rendered.
pub fn write_series(mut series: Series, dir: &Path) -> Result<Option<WrittenFile>, HarvestError> {
    if series.is_empty() {
        #[cfg(feature = "tracing")]
        tracing::warn!(symbol = %series.symbol, "No data available");
        return Ok(None);
    }
    series.sort_by_time();

    std::fs::create_dir_all(dir).map_err(|e| HarvestError::io(dir, e))?;
    let path: PathBuf = dir.join(file_name_for(&series.symbol));
    let mut out = csv::Writer::from_path(&path).map_err(|e| HarvestError::io(&path, e))?;
    out.write_record(HEADER)
        .map_err(|e| HarvestError::io(&path, e))?;
    for c in &series.candles {
        out.write_record([
            format_timestamp(c.open_time)?,
            c.open.normalize().to_string(),
            c.high.normalize().to_string(),
            c.low.normalize().to_string(),
            c.close.normalize().to_string(),
            c.volume.normalize().to_string(),
        ])
        .map_err(|e| HarvestError::io(&path, e))?;
    }
    out.flush().map_err(|e| HarvestError::io(&path, e))?;

    #[cfg(feature = "tracing")]
    tracing::info!(symbol = %series.symbol, rows = series.len(), path = %path.display(), "saved");
    Ok(Some(WrittenFile {
        rows: series.len(),
        symbol: series.symbol,
        path,
    }))
}
