//! Retry execution with exponential backoff and per-attempt deadlines.

use crate::backoff::BackoffScheduler;
use crate::classify::ErrorClassifier;
use std::future::Future;
use std::time::Duration;
use taskgen_core::{InvokeResult, RawFailure};
use tracing::{debug, warn};

/// Retry policy parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single backoff delay.
    pub max_delay: Duration,
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Backoff growth factor between attempts.
    pub multiplier: f64,
    /// Whether backoff delays are jittered.
    pub jitter: bool,
    /// Deadline for a single underlying call.
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_attempts: 5,
            multiplier: 2.0,
            jitter: false,
            attempt_timeout: Duration::from_secs(120),
        }
    }
}

/// Outcome of a retried operation: the terminal result plus the number of
/// attempts that produced it.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    /// Attempts made, including the final one.
    pub attempts: u32,
    /// Terminal result; errors carry the last classification unchanged.
    pub result: InvokeResult<T>,
}

impl<T> RetryOutcome<T> {
    /// Check if the operation ultimately succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Drives one logical operation through up to `max_attempts` attempts.
///
/// Each failure is classified; only `Retryable` and `RateLimited` kinds are
/// retried, after the scheduled backoff delay. `ClientError` and `Fatal`
/// terminate immediately regardless of remaining budget. The terminal error
/// is always the last classified failure, never a synthetic
/// retries-exhausted wrapper.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    classifier: ErrorClassifier,
    backoff: BackoffScheduler,
}

impl RetryExecutor {
    /// Create an executor from a policy and classifier.
    #[must_use]
    pub fn new(config: RetryConfig, classifier: ErrorClassifier) -> Self {
        let backoff = BackoffScheduler::new(
            config.initial_delay,
            config.max_delay,
            config.multiplier,
            config.jitter,
        );
        Self {
            config,
            classifier,
            backoff,
        }
    }

    /// Create with default policy and classifier.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default(), ErrorClassifier::new())
    }

    /// Get the policy.
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `op` to a terminal result.
    ///
    /// Every attempt executes under the per-attempt deadline; an elapsed
    /// deadline is classified like any other failure. Backoff waits are
    /// plain sleeps, cancelled by dropping the returned future.
    pub async fn run<F, Fut, T>(&self, op: F) -> RetryOutcome<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, RawFailure>>,
    {
        let mut attempt: u32 = 1;

        loop {
            let outcome = match tokio::time::timeout(self.config.attempt_timeout, op()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(RawFailure::timeout(self.config.attempt_timeout)),
            };

            match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempts = attempt, "Succeeded after retry");
                    }
                    return RetryOutcome {
                        attempts: attempt,
                        result: Ok(value),
                    };
                }
                Err(raw) => {
                    let classified = self.classifier.classify(&raw);

                    if !classified.is_retryable() || attempt >= self.config.max_attempts {
                        return RetryOutcome {
                            attempts: attempt,
                            result: Err(classified),
                        };
                    }

                    let delay = self.backoff.delay_for(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.config.max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %classified,
                        "Retrying after transient failure"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
