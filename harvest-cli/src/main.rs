//! Downloads 15m candles for every Binance USDT pair, ten years back, into
//! `<base>_<quote>.csv` files in the current directory.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use harvest::Harvester;
use harvest_binance::BinanceConnector;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let connector = BinanceConnector::rate_limited().build();
    let harvester = Harvester::builder().with_connector(connector).build()?;

    let report = harvester.run().await?;
    tracing::info!(
        symbols = report.symbols,
        files = report.written.len(),
        empty = report.empty.len(),
        rows = report.total_rows(),
        "harvest complete"
    );
    Ok(())
}
