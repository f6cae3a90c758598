//! Driver loop: enumerate symbols, then fetch and persist each one in turn.

use harvest_core::{HarvestError, HarvestReport, Symbol, WrittenFile, pairs_quoted_in};

use crate::Harvester;
use crate::writer::write_series;

impl Harvester {
    /// Symbols quoted in the configured currency, in exchange listing order.
    ///
    /// # Errors
    /// Returns `Unsupported` if the connector cannot list markets, or the
    /// error that escaped the retry policy.
    pub async fn symbols(&self) -> Result<Vec<Symbol>, HarvestError> {
        let provider = self
            .connector
            .as_markets_provider()
            .ok_or_else(|| HarvestError::unsupported("markets"))?;
        let markets = self
            .with_retry("markets", move || {
                self.provider_call("markets", provider.load_markets())
            })
            .await?;
        Ok(pairs_quoted_in(&markets, &self.cfg.quote))
    }

    /// Harvest every market quoted in the configured currency.
    ///
    /// # Errors
    /// Any error escaping a single symbol aborts the whole run.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "harvest::run", skip(self), fields(quote = %self.cfg.quote))
    )]
    pub async fn run(&self) -> Result<HarvestReport, HarvestError> {
        let symbols = self.symbols().await?;
        #[cfg(feature = "tracing")]
        tracing::info!(count = symbols.len(), "selected symbols");
        self.run_symbols(&symbols).await
    }

    /// Harvest an explicit list of symbols, in order.
    ///
    /// # Errors
    /// Any error escaping a single symbol aborts the whole run.
    pub async fn run_symbols(&self, symbols: &[Symbol]) -> Result<HarvestReport, HarvestError> {
        let mut report = HarvestReport {
            symbols: symbols.len(),
            ..HarvestReport::default()
        };
        for symbol in symbols {
            match self.harvest_symbol(symbol).await? {
                Some(file) => report.written.push(file),
                None => report.empty.push(symbol.clone()),
            }
        }
        Ok(report)
    }

    /// Fetch and persist one symbol. `Ok(None)` when the exchange has no candles.
    ///
    /// # Errors
    /// Propagates fetch and write failures.
    pub async fn harvest_symbol(&self, symbol: &Symbol) -> Result<Option<WrittenFile>, HarvestError> {
        #[cfg(feature = "tracing")]
        tracing::info!(symbol = %symbol, "fetching");
        let series = self.fetch_series(symbol).await?;
        write_series(series, &self.cfg.output_dir)
    }
}
