//! Exponential backoff scheduling.

use rand::Rng;
use std::time::Duration;

/// Computes the delay before each retry attempt.
///
/// The deterministic delay for 1-based attempt `n` is
/// `min(initial * multiplier^(n-1), max)`. With jitter enabled the returned
/// delay is drawn uniformly from `[0, delay]` (full jitter); the
/// deterministic value is always the upper bound, so jittered delays never
/// exceed the unjittered schedule.
///
/// Pure function of the policy and the attempt index; safe to call from any
/// number of tasks concurrently.
#[derive(Debug, Clone)]
pub struct BackoffScheduler {
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: bool,
}

impl BackoffScheduler {
    /// Create a scheduler from policy parameters.
    #[must_use]
    pub fn new(initial_delay: Duration, max_delay: Duration, multiplier: f64, jitter: bool) -> Self {
        Self {
            initial_delay,
            max_delay,
            multiplier,
            jitter,
        }
    }

    /// Delay before the retry that follows 1-based attempt `attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let base = self.initial_delay.as_millis() as f64;
        let delay = base * self.multiplier.powi(exponent as i32);
        let delay = delay.min(self.max_delay.as_millis() as f64);

        if self.jitter {
            let jittered = rand::thread_rng().gen_range(0.0..=delay);
            Duration::from_millis(jittered as u64)
        } else {
            Duration::from_millis(delay as u64)
        }
    }
}
