//! Courtesy pauses between successive outbound requests.
//!
//! Not a rate limiter: the locator simply sleeps `delay + jitter` between
//! pattern probes and between search queries so a single run does not
//! hammer one host.

use std::time::Duration;

/// Configuration for the pause inserted between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Fixed part of every pause.
    pub delay: Duration,

    /// Maximum random jitter added on top of `delay` (uniform [0, jitter]).
    pub jitter: Duration,
}

impl PacingConfig {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// No pauses at all. Used by tests.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Compute the effective delay for a single pause (delay + random jitter).
    pub fn effective_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let jitter_ms = rand_jitter_ms(self.jitter.as_millis() as u64);
        self.delay + Duration::from_millis(jitter_ms)
    }

    /// Sleep for one effective delay.
    pub async fn pause(&self) {
        let wait = self.effective_delay();
        if wait.is_zero() {
            return;
        }
        tracing::debug!(sleep_ms = %wait.as_millis(), "Pausing between requests");
        tokio::time::sleep(wait).await;
    }
}

impl Default for PacingConfig {
    /// 0.5 s plus up to 1 s of jitter.
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            jitter: Duration::from_millis(1000),
        }
    }
}

// Xorshift seeded from the clock; good enough for jitter, not crypto.
fn rand_jitter_ms(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }
    let mut x = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x % max_ms
}
