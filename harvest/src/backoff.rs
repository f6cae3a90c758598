use std::time::Duration;

use harvest_core::BackoffConfig;
use rand::Rng;

/// Add up to `jitter_percent` percent of random jitter to `base_ms`.
#[must_use]
pub fn jitter_wait(base_ms: u64, jitter_percent: u32) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100)
    };
    let mut rng = rand::rng();
    base_ms.saturating_add(rng.random_range(0..jitter_range))
}

/// Delay schedule between attempts of one request.
///
/// Starts at `min_backoff_ms` and multiplies by `factor` after every delay,
/// capped at `max_backoff_ms`.
#[derive(Debug, Clone)]
pub struct Backoff {
    cfg: BackoffConfig,
    current_ms: u64,
}

impl Backoff {
    #[must_use]
    pub const fn new(cfg: BackoffConfig) -> Self {
        Self {
            current_ms: cfg.min_backoff_ms,
            cfg,
        }
    }

    /// Delay before the next attempt.
    ///
    /// A server-provided `retry_after_ms` hint raises the delay but never lowers it.
    pub fn next_delay(&mut self, retry_after_ms: Option<u64>) -> Duration {
        let base = self.current_ms.min(self.cfg.max_backoff_ms);
        let jittered = jitter_wait(base, u32::from(self.cfg.jitter_percent));
        self.current_ms = self
            .current_ms
            .saturating_mul(u64::from(self.cfg.factor.max(1)))
            .min(self.cfg.max_backoff_ms);
        Duration::from_millis(retry_after_ms.map_or(jittered, |hint| jittered.max(hint)))
    }

    /// Return to the initial delay.
    pub const fn reset(&mut self) {
        self.current_ms = self.cfg.min_backoff_ms;
    }
}
