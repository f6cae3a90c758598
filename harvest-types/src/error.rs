use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the harvest workspace.
///
/// Covers capability mismatches, argument validation, connector-tagged
/// failures, rate limiting, local I/O and retry exhaustion.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HarvestError {
    /// The requested capability is not implemented by the target connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "ohlcv").
        capability: String,
    },

    /// Issues with the returned or expected data (malformed rows, missing fields).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual connector returned an error (network or exchange side).
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A market or symbol could not be found on the exchange.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "market FOO/USDT".
        what: String,
    },

    /// The exchange rejected the request because of its rate limit.
    #[error("rate limit exceeded: retry_after_ms={retry_after_ms:?}")]
    RateLimitExceeded {
        /// Server-provided back-off hint, when present.
        retry_after_ms: Option<u64>,
    },

    /// An individual connector call exceeded the configured timeout.
    #[error("provider timed out: {capability} via {connector}")]
    ProviderTimeout {
        /// Connector name that timed out.
        connector: String,
        /// Capability label (e.g. "ohlcv", "markets").
        capability: String,
    },

    /// Local filesystem failure while persisting a series.
    #[error("i/o error on {path}: {msg}")]
    Io {
        /// Path being read or written.
        path: String,
        /// Underlying error message.
        msg: String,
    },

    /// A bounded retry policy gave up; carries the last observed error.
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made, including the first one.
        attempts: u32,
        /// The error returned by the final attempt.
        last: Box<HarvestError>,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl HarvestError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(connector: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            connector: connector.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build an `Io` error from a path and any displayable cause.
    pub fn io(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            msg: err.to_string(),
        }
    }

    /// Returns true if the failure is worth retrying with the same request.
    ///
    /// Network and exchange-side failures, rate-limit rejections and timeouts
    /// are transient. Malformed data, unknown symbols, bad arguments and local
    /// I/O are not: repeating the request would fail the same way.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connector { .. } | Self::RateLimitExceeded { .. } | Self::ProviderTimeout { .. }
        )
    }

    /// Server-suggested delay before retrying, if the error carries one.
    #[must_use]
    pub const fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimitExceeded { retry_after_ms } => *retry_after_ms,
            _ => None,
        }
    }
}
