//! End-to-end invocation flows
//!
//! Full client flows against the scripted backend, including the
//! production quota scenario: 200/day, 50/hour, 10/minute per operation.

use crate::helpers::*;
use crate::mock_backend::MockBackend;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use taskgen_client::{GenerativeBackend, GenerativeClient};
use taskgen_config::CoreConfig;
use taskgen_core::{ErrorKind, GenerationRequest, InvokeError, RawFailure, TIER_DAILY, TIER_HOURLY};

/// After 10 admitted same-kind calls within a minute, the 11th is denied
/// with the per-minute tier's retry-after, while daily and hourly budgets
/// remain.
#[tokio::test]
async fn test_per_minute_cap_denies_eleventh_call() {
    let backend = Arc::new(MockBackend::healthy());
    let client = test_client(Arc::clone(&backend));

    for i in 0..10 {
        let invocation = client.generate_text(format!("prompt {i}")).await;
        assert!(invocation.is_success(), "call {i} should be admitted");
    }

    let denied = client.generate_text("one too many").await;
    assert_eq!(denied.attempts(), 0);
    let err = denied.error().expect("11th call denied");
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert!(err
        .retry_after()
        .is_some_and(|d| d > Duration::ZERO && d <= Duration::from_secs(60)));

    // The backend saw exactly the admitted calls.
    assert_eq!(backend.calls(), 10);

    // Daily and hourly budgets were consumed only by admitted calls.
    assert_eq!(client.limiter().used(TIER_DAILY), Some(10));
    assert_eq!(client.limiter().used(TIER_HOURLY), Some(10));
    assert_eq!(
        client.limiter().used("per_minute:text_generation"),
        Some(10)
    );
}

/// Operation kinds are isolated: exhausting text generation leaves code
/// generation admissible.
#[tokio::test]
async fn test_operation_kinds_have_independent_minute_caps() {
    let backend = Arc::new(MockBackend::healthy());
    let client = test_client(Arc::clone(&backend));

    for _ in 0..10 {
        assert!(client.generate_text("text").await.is_success());
    }
    assert!(!client.generate_text("text").await.is_success());

    // A different operation kind still has per-minute budget.
    let invocation = client.generate_code("fn main() {}").await;
    assert!(invocation.is_success());

    let invocation = client
        .classify_text("I love this product", ["positive", "negative"])
        .await;
    assert!(invocation.is_success());
}

/// The hourly cap binds across operation kinds once per-minute budgets
/// allow enough throughput.
#[tokio::test]
async fn test_hourly_cap_binds_across_kinds() {
    let backend = Arc::new(MockBackend::healthy());
    // Generous per-minute budgets so only the hourly tier binds.
    let mut tiers = production_tiers();
    for tier in &mut tiers {
        if tier.name.starts_with("per_minute:") {
            tier.capacity = 100;
        }
    }
    let client = test_client_with(Arc::clone(&backend), tiers, fast_retry(5));

    let mut admitted = 0u32;
    for i in 0..60 {
        let request = if i % 2 == 0 {
            GenerationRequest::text("text")
        } else {
            GenerationRequest::code("code")
        };
        if client.invoke(request).await.is_success() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 50);
    assert_eq!(client.limiter().used(TIER_HOURLY), Some(50));
}

/// A denied call must not consume quota, so capacity frees exactly when the
/// window rolls over and the denied caller retries.
#[tokio::test]
async fn test_denied_calls_recover_after_window() {
    let backend = Arc::new(MockBackend::healthy());
    let mut tiers = production_tiers();
    for tier in &mut tiers {
        if tier.name == "per_minute:text_generation" {
            tier.capacity = 2;
            tier.window = Duration::from_millis(50);
        }
    }
    let client = test_client_with(Arc::clone(&backend), tiers, fast_retry(5));

    assert!(client.generate_text("a").await.is_success());
    assert!(client.generate_text("b").await.is_success());
    assert!(!client.generate_text("c").await.is_success());

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(client.generate_text("c again").await.is_success());
}

/// Validation failures surface before admission: no quota, no backend call.
#[tokio::test]
async fn test_validation_precedes_admission() {
    let backend = Arc::new(MockBackend::healthy());
    let client = test_client(Arc::clone(&backend));

    let invocation = client
        .classify_text("some text", Vec::<String>::new())
        .await;
    assert_eq!(invocation.attempts(), 0);
    assert_eq!(
        invocation.error().map(InvokeError::kind),
        Some(ErrorKind::ClientError)
    );
    assert_eq!(backend.calls(), 0);
    assert_eq!(client.limiter().used(TIER_DAILY), Some(0));
}

/// Retries happen inside one admission: a flaky call that needs three
/// attempts consumes one unit of every gating tier.
#[tokio::test]
async fn test_retries_consume_single_admission() {
    let backend = Arc::new(MockBackend::scripted([
        Err(RawFailure::http(500, "internal")),
        Err(RawFailure::http(503, "unavailable")),
    ]));
    let client = test_client(Arc::clone(&backend));

    let invocation = client.generate_text("flaky").await;
    assert!(invocation.is_success());
    assert_eq!(invocation.attempts(), 3);

    assert_eq!(client.limiter().used(TIER_DAILY), Some(1));
    assert_eq!(client.limiter().used(TIER_HOURLY), Some(1));
    assert_eq!(client.limiter().used("per_minute:text_generation"), Some(1));
}

/// Concurrent invocations respect the per-minute cap exactly.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_invocations_respect_caps() {
    let backend = Arc::new(MockBackend::healthy());
    let client = Arc::new(test_client(Arc::clone(&backend)));

    let tasks: Vec<_> = (0..30)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.generate_text(format!("p{i}")).await.is_success() })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;
    let succeeded = results
        .into_iter()
        .filter(|r| *r.as_ref().expect("task completes"))
        .count();

    assert_eq!(succeeded, 10);
    assert_eq!(backend.calls(), 10);
}

/// The built-in configuration defaults wire the production quota scenario
/// end to end.
#[tokio::test]
async fn test_config_defaults_enforce_production_quotas() {
    let backend = Arc::new(MockBackend::healthy());
    let config = CoreConfig::default();
    config.validate().expect("defaults are valid");

    let client = GenerativeClient::from_config(&config, Arc::clone(&backend) as Arc<dyn GenerativeBackend>);

    for _ in 0..10 {
        assert!(client.generate_text("hello").await.is_success());
    }
    let denied = client.generate_text("hello").await;
    assert_eq!(
        denied.error().map(InvokeError::kind),
        Some(ErrorKind::RateLimited)
    );
    assert_eq!(backend.calls(), 10);
}

/// The classification payload round-trips untouched through the facade.
#[tokio::test]
async fn test_payload_passes_through_uninterpreted() {
    let backend = Arc::new(MockBackend::healthy());
    let client = test_client(Arc::clone(&backend));

    let invocation = client
        .invoke(
            GenerationRequest::classification("It broke on day two", ["positive", "negative"])
                .with_temperature(0.0),
        )
        .await;

    let response = invocation.into_result().expect("success");
    assert_eq!(response.content, "echo: It broke on day two");
    assert_eq!(response.model.as_deref(), Some("mock-model"));
}
