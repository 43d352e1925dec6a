//! Polling policy: how long to wait before the next periodic scan.
//!
//! Kept separate from reconciliation so a push-based invalidation source can
//! replace polling without touching the scan logic.

use crate::config::ScannerConfig;
use std::sync::Arc;
use std::time::Duration;

pub trait PollPolicy: Send + Sync {
    /// Delay before the next scan, given how many scans in a row have failed.
    fn next_delay(&self, consecutive_failures: u32) -> Duration;
}

/// Same delay regardless of outcome.
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval(pub Duration);

impl PollPolicy for FixedInterval {
    fn next_delay(&self, _consecutive_failures: u32) -> Duration {
        self.0
    }
}

/// Doubles the base delay per consecutive failure, capped at `max`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
}

impl PollPolicy for Backoff {
    fn next_delay(&self, consecutive_failures: u32) -> Duration {
        let factor = 1u32.checked_shl(consecutive_failures.min(31)).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .unwrap_or(self.max)
            .min(self.max)
    }
}

pub fn policy_from_config(config: &ScannerConfig) -> Arc<dyn PollPolicy> {
    if config.backoff {
        Arc::new(Backoff {
            base: config.interval(),
            max: Duration::from_secs(config.max_backoff_secs),
        })
    } else {
        Arc::new(FixedInterval(config.interval()))
    }
}
