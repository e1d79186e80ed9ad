//! The resilient client facade.

use crate::backend::GenerativeBackend;
use std::sync::Arc;
use taskgen_config::{ConfigError, CoreConfig};
use taskgen_core::{GenerationRequest, GenerationResponse, Invocation, InvokeError};
use taskgen_resilience::{
    Admission, ErrorClassifier, RateLimiter, RetryConfig, RetryExecutor, TierConfig,
};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Resilience wrapper around a pluggable generative backend.
///
/// Admission runs before anything else: a denied call consumes no retry
/// budget and never reaches the backend. Admitted calls are driven by the
/// retry executor to a terminal result.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use taskgen_client::{GenerativeBackend, GenerativeClient};
/// use taskgen_config::load_config;
/// use taskgen_core::GenerationRequest;
///
/// # async fn example(backend: Arc<dyn GenerativeBackend>) -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config()?;
/// let client = GenerativeClient::from_config(&config, backend);
///
/// let invocation = client
///     .invoke(GenerationRequest::text("Write a one-sentence story about a cat."))
///     .await;
/// let response = invocation.into_result()?;
/// println!("{}", response.content);
/// # Ok(())
/// # }
/// ```
pub struct GenerativeClient {
    backend: Arc<dyn GenerativeBackend>,
    limiter: Arc<RateLimiter>,
    executor: RetryExecutor,
}

impl GenerativeClient {
    /// Create a client builder.
    #[must_use]
    pub fn builder() -> GenerativeClientBuilder {
        GenerativeClientBuilder::new()
    }

    /// Build a client from validated startup configuration.
    #[must_use]
    pub fn from_config(config: &CoreConfig, backend: Arc<dyn GenerativeBackend>) -> Self {
        let tiers = config
            .tiers
            .iter()
            .map(|t| TierConfig::new(&t.name, t.capacity, t.window))
            .collect();
        let retry = RetryConfig {
            initial_delay: config.retry.initial_delay,
            max_delay: config.retry.max_delay,
            max_attempts: config.retry.max_attempts,
            multiplier: config.retry.multiplier,
            jitter: config.retry.jitter,
            attempt_timeout: config.retry.attempt_timeout,
        };
        Self {
            backend,
            limiter: Arc::new(RateLimiter::new(tiers)),
            executor: RetryExecutor::new(retry, ErrorClassifier::new()),
        }
    }

    /// Drive one request to a terminal result.
    ///
    /// The outcome always reports how many attempts were made: zero when
    /// validation or admission rejected the call before the first attempt.
    #[instrument(
        skip(self, request),
        fields(invocation_id = tracing::field::Empty, operation = %request.operation)
    )]
    pub async fn invoke(&self, request: GenerationRequest) -> Invocation<GenerationResponse> {
        let id = Uuid::new_v4();
        tracing::Span::current().record("invocation_id", tracing::field::display(id));

        if let Err(err) = request.validate() {
            debug!(error = %err, "Request rejected before admission");
            return Invocation::new(id, 0, Err(err));
        }

        let keys = request.tier_keys();
        match self.limiter.admit(&keys) {
            Ok(Admission::Allowed) => {}
            Ok(Admission::Denied { tier, retry_after }) => {
                return Invocation::new(
                    id,
                    0,
                    Err(InvokeError::rate_limited(
                        format!("local quota tier '{tier}' exhausted"),
                        Some(retry_after),
                    )),
                );
            }
            Err(err) => return Invocation::new(id, 0, Err(err)),
        }

        let outcome = self
            .executor
            .run(|| {
                let backend = Arc::clone(&self.backend);
                let request = request.clone();
                async move { backend.call(&request).await }
            })
            .await;

        debug!(
            attempts = outcome.attempts,
            success = outcome.is_success(),
            "Invocation complete"
        );
        Invocation::new(id, outcome.attempts, outcome.result)
    }

    /// Convenience: invoke a text-generation request.
    pub async fn generate_text(
        &self,
        prompt: impl Into<String>,
    ) -> Invocation<GenerationResponse> {
        self.invoke(GenerationRequest::text(prompt)).await
    }

    /// Convenience: invoke a code-generation request.
    pub async fn generate_code(
        &self,
        prompt: impl Into<String>,
    ) -> Invocation<GenerationResponse> {
        self.invoke(GenerationRequest::code(prompt)).await
    }

    /// Convenience: invoke a classification request.
    pub async fn classify_text(
        &self,
        text: impl Into<String>,
        categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Invocation<GenerationResponse> {
        self.invoke(GenerationRequest::classification(text, categories))
            .await
    }

    /// The limiter backing this client, for usage reporting.
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

/// Builder for [`GenerativeClient`].
#[derive(Default)]
pub struct GenerativeClientBuilder {
    backend: Option<Arc<dyn GenerativeBackend>>,
    tiers: Vec<TierConfig>,
    retry: RetryConfig,
    classifier: ErrorClassifier,
}

impl GenerativeClientBuilder {
    /// Create a builder with default retry policy and classifier and no
    /// tiers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend.
    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn GenerativeBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Add a quota tier.
    #[must_use]
    pub fn tier(mut self, tier: TierConfig) -> Self {
        self.tiers.push(tier);
        self
    }

    /// Replace all quota tiers.
    #[must_use]
    pub fn tiers(mut self, tiers: Vec<TierConfig>) -> Self {
        self.tiers = tiers;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the error classifier.
    #[must_use]
    pub fn classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when no backend was supplied.
    pub fn build(self) -> Result<GenerativeClient, ConfigError> {
        let backend = self
            .backend
            .ok_or_else(|| ConfigError::invalid("a backend is required"))?;
        Ok(GenerativeClient {
            backend,
            limiter: Arc::new(RateLimiter::new(self.tiers)),
            executor: RetryExecutor::new(self.retry, self.classifier),
        })
    }
}
