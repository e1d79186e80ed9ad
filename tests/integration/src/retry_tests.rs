//! Retry behavior integration tests
//!
//! Attempt accounting, classification-driven termination, and backoff
//! scheduling as observed through the executor and the client.

use crate::helpers::*;
use crate::mock_backend::MockBackend;
use std::sync::Arc;
use std::time::Duration;
use taskgen_core::{ErrorKind, InvokeError, RawFailure};
use taskgen_resilience::{BackoffScheduler, ErrorClassifier, RetryExecutor};

/// The documented no-jitter schedule for the production policy.
#[test]
fn test_production_backoff_schedule() {
    let scheduler =
        BackoffScheduler::new(Duration::from_secs(1), Duration::from_secs(60), 2.0, false);

    let delays: Vec<Duration> = (1..=4).map(|n| scheduler.delay_for(n)).collect();
    assert_eq!(
        delays,
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8),
        ]
    );
}

/// A client error is invoked exactly once, never retried.
#[tokio::test]
async fn test_client_error_invoked_once() {
    let backend = Arc::new(MockBackend::always_failing(RawFailure::http(
        400,
        "missing field: prompt",
    )));
    let client = test_client(Arc::clone(&backend));

    let invocation = client.generate_text("hello").await;
    assert_eq!(backend.calls(), 1);
    assert_eq!(invocation.attempts(), 1);
    assert_eq!(
        invocation.error().map(InvokeError::kind),
        Some(ErrorKind::ClientError)
    );
}

/// An always-transient failure consumes the whole attempt budget and
/// surfaces the last classified error, not a synthetic wrapper.
#[tokio::test]
async fn test_transient_failure_exhausts_budget() {
    let backend = Arc::new(MockBackend::always_failing(RawFailure::http(
        503,
        "upstream unavailable",
    )));
    let client = test_client(Arc::clone(&backend));

    let invocation = client.generate_text("hello").await;
    assert_eq!(backend.calls(), 5);
    assert_eq!(invocation.attempts(), 5);

    let err = invocation.error().expect("terminal failure");
    assert_eq!(err.kind(), ErrorKind::Retryable);
    assert_eq!(err.status_hint(), Some(503));
    assert!(err.message().contains("upstream unavailable"));
}

/// An upstream quota failure is retried and can recover within the budget.
#[tokio::test]
async fn test_upstream_rate_limit_recovers() {
    let backend = Arc::new(MockBackend::scripted([
        Err(RawFailure::http(429, "quota exceeded").with_retry_after(Duration::from_millis(1))),
        Err(RawFailure::http(429, "quota exceeded")),
    ]));
    let client = test_client(Arc::clone(&backend));

    let invocation = client.generate_text("hello").await;
    assert!(invocation.is_success());
    assert_eq!(invocation.attempts(), 3);
    assert_eq!(backend.calls(), 3);
}

/// A stalled backend call is cut off by the per-attempt deadline and
/// classified as retryable.
#[tokio::test(start_paused = true)]
async fn test_attempt_deadline_cuts_off_stalled_call() {
    let executor = RetryExecutor::new(
        taskgen_resilience::RetryConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            max_attempts: 2,
            multiplier: 2.0,
            jitter: false,
            attempt_timeout: Duration::from_millis(100),
        },
        ErrorClassifier::new(),
    );

    let outcome = executor
        .run(|| async {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok::<_, RawFailure>(())
        })
        .await;

    assert_eq!(outcome.attempts, 2);
    let err = outcome.result.expect_err("deadline exceeded");
    assert_eq!(err.kind(), ErrorKind::Retryable);
}

/// A slow backend is bounded by the per-attempt deadline at the client
/// level too: the worker is released instead of hanging.
#[tokio::test(start_paused = true)]
async fn test_client_bounds_slow_backend() {
    let backend = Arc::new(MockBackend::healthy().with_latency(Duration::from_secs(600)));
    let client = test_client_with(Arc::clone(&backend), production_tiers(), fast_retry(2));

    let invocation = client.generate_text("slow").await;
    assert_eq!(invocation.attempts(), 2);
    assert_eq!(backend.calls(), 2);
    assert_eq!(
        invocation.error().map(InvokeError::kind),
        Some(ErrorKind::Retryable)
    );
}

/// A fatal classification short-circuits even with budget remaining.
#[tokio::test]
async fn test_fatal_failure_not_retried() {
    let backend = Arc::new(MockBackend::always_failing(RawFailure::coded(
        "unknown_kind",
        "unrecognized upstream response",
    )));
    let client = test_client(Arc::clone(&backend));

    let invocation = client.generate_text("hello").await;
    assert_eq!(backend.calls(), 1);
    assert_eq!(invocation.attempts(), 1);

    let err = invocation.error().expect("terminal failure");
    assert_eq!(err.kind(), ErrorKind::Fatal);
    assert!(err.message().contains("unrecognized upstream response"));
}

/// Success after transient failures reports the true attempt count.
#[tokio::test]
async fn test_attempt_count_is_observable() {
    let backend = Arc::new(MockBackend::scripted([
        Err(RawFailure::transport("connection reset")),
        Err(RawFailure::http(502, "bad gateway")),
    ]));
    let client = test_client(Arc::clone(&backend));

    let invocation = client.generate_code("fn main() {}").await;
    assert!(invocation.is_success());
    assert_eq!(invocation.attempts(), 3);
}
