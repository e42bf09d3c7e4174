//! Politeness delays between browser actions.

use jobtrail_core::PacingConfig;
use rand::Rng;
use std::time::Duration;

/// Sleeps for the configured politeness delays.
///
/// Cloned into each component that drives the browser. With
/// [`PacingConfig::none`] every pause returns immediately.
#[derive(Debug, Clone, Default)]
pub struct Pacing {
    config: PacingConfig,
}

impl Pacing {
    #[must_use]
    pub fn new(config: PacingConfig) -> Self {
        Self { config }
    }

    /// Pacing with every delay disabled.
    #[must_use]
    pub fn none() -> Self {
        Self::new(PacingConfig::none())
    }

    #[must_use]
    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    /// Sleep for a fixed number of milliseconds.
    pub async fn pause(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    /// Sleep for a uniformly random time within the jitter range.
    pub async fn jitter(&self) {
        let delay = self.jitter_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn jitter_delay(&self) -> Duration {
        let lo = self.config.jitter_min_ms.min(self.config.jitter_max_ms);
        let hi = self.config.jitter_min_ms.max(self.config.jitter_max_ms);
        if hi == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }
}
