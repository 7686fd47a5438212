//! Poll cadence: how long to wait before each status query and when to give up.
//!
//! The Read API default is a constant 1 s wait and ten polls; backoff and
//! jitter are available for slower tiers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use cardread_config::PollConfig;
use cardread_config::defaults::{
    DEFAULT_POLL_BACKOFF_FACTOR, DEFAULT_POLL_DELAY_MS, DEFAULT_POLL_MAX_ATTEMPTS,
    DEFAULT_POLL_MAX_DELAY_MS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollPolicy {
    /// Status queries made before the operation is declared timed out.
    pub max_attempts: u32,
    /// Wait before the first poll, in milliseconds.
    pub delay_ms: u64,
    /// Growth factor per poll; 1.0 keeps the wait constant.
    pub backoff_factor: f64,
    /// Upper bound on any single wait.
    pub max_delay_ms: u64,
    /// ±25% random spread on each wait.
    pub jitter: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            delay_ms: DEFAULT_POLL_DELAY_MS,
            backoff_factor: DEFAULT_POLL_BACKOFF_FACTOR,
            max_delay_ms: DEFAULT_POLL_MAX_DELAY_MS,
            jitter: false,
        }
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        let base = Self::default();
        Self {
            max_attempts: config.max_attempts.unwrap_or(base.max_attempts),
            delay_ms: config.delay_ms.unwrap_or(base.delay_ms),
            backoff_factor: config.backoff_factor.unwrap_or(base.backoff_factor),
            max_delay_ms: config.max_delay_ms.unwrap_or(base.max_delay_ms),
            jitter: config.jitter.unwrap_or(base.jitter),
        }
    }
}

impl PollPolicy {
    /// Same attempt ceiling, no waiting. For tests and local fakes.
    pub fn immediate() -> Self {
        Self {
            delay_ms: 0,
            max_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Wait before poll number `attempt` (1-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = if self.backoff_factor.is_finite() {
            self.backoff_factor.max(1.0)
        } else {
            1.0
        };
        let delay_ms = self.delay_ms as f64 * factor.powi((attempt - 1).min(i32::MAX as u32) as i32);
        let delay_ms = delay_ms.min(self.max_delay_ms as f64) as u64;

        let delay_ms = if self.jitter {
            let spread = delay_ms / 4;
            if spread > 0 {
                let offset = rand_offset() % (spread * 2 + 1);
                delay_ms - spread + offset
            } else {
                delay_ms
            }
        } else {
            delay_ms
        };

        Duration::from_millis(delay_ms)
    }

    /// Whether another poll may be made after `attempts_made` polls.
    pub fn should_poll(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// Worst-case time spent waiting, ignoring request latency and jitter.
    pub fn worst_case_wait(&self) -> Duration {
        (1..=self.max_attempts).map(|n| self.delay_for_without_jitter(n)).sum()
    }

    fn delay_for_without_jitter(&self, attempt: u32) -> Duration {
        Self { jitter: false, ..self.clone() }.delay_for(attempt)
    }
}

/// xorshift64 for jitter; no need for a full rand dependency.
fn rand_offset() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static SEED: AtomicU64 = AtomicU64::new(0x2545_f491_4f6c_dd1d);
    let mut x = SEED.load(Ordering::Relaxed);
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    SEED.store(x, Ordering::Relaxed);
    x
}
