use std::sync::Arc;

use harvest_core::connector::ExchangeConnector;
use harvest_middleware::ConnectorBuilder as GenericConnectorBuilder;

use crate::BinanceConnector;

/// Builder type alias specialized for Binance connectors.
pub type BinanceConnectorBuilder = GenericConnectorBuilder;

impl BinanceConnector {
    /// Returns an unconfigured builder with the default connector.
    ///
    /// Customize with the builder methods before calling `.build()`.
    #[must_use]
    pub fn builder() -> BinanceConnectorBuilder {
        let raw: Arc<dyn ExchangeConnector> = Arc::new(Self::new_default());
        GenericConnectorBuilder::new(raw)
    }

    /// Returns a builder that spaces requests by the exchange's mandated
    /// minimum interval (one request every 50 ms).
    #[must_use]
    pub fn rate_limited() -> BinanceConnectorBuilder {
        Self::builder().with_default_rate_limit()
    }

    /// Expert-only: construct an unwrapped connector for manual composition.
    #[must_use]
    pub fn new_raw() -> Self {
        Self::new_default()
    }
}
