//! Exponential reconnect backoff.
//!
//! One policy for every retry loop in the bridge: the base delay doubles
//! per attempt up to a cap, and jitter (when enabled) widens each delay
//! symmetrically to ±20% of the base so that restarts across a fleet do
//! not synchronize.

use std::time::Duration;

use rand::Rng as _;

/// Exponential backoff calculator with an attempt counter.
///
/// The counter advances on [`next_delay`](Self::next_delay) and is reset
/// on any success via [`reset`](Self::reset). Attempts are never capped —
/// only the delay is.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    jitter: bool,
    attempt: u32,
}

impl Backoff {
    /// Create a backoff starting at `initial`, doubling up to `max`.
    #[must_use]
    pub fn new(initial: Duration, max: Duration, jitter: bool) -> Self {
        Self {
            initial,
            max,
            jitter,
            attempt: 0,
        }
    }

    /// The delay for the current attempt; advances the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.delay_for_attempt(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Reset the attempt counter after a success.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Number of consecutive failures so far.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The delay for a specific 0-based attempt number.
    ///
    /// Without jitter this is exactly `min(max, initial * 2^attempt)`;
    /// with jitter the result is drawn uniformly from ±20% of that base.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_for_attempt(attempt);
        if self.jitter {
            let factor = rand::thread_rng().gen_range(0.8..=1.2);
            Duration::from_secs_f64((base.as_secs_f64() * factor).max(0.0))
        } else {
            base
        }
    }

    fn base_for_attempt(&self, attempt: u32) -> Duration {
        // 2^64 already dwarfs any sane cap; clamp the exponent so powi
        // stays finite.
        let exponent = i32::try_from(attempt.min(64)).unwrap_or(64);
        let secs = (self.initial.as_secs_f64() * 2f64.powi(exponent)).min(self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}
