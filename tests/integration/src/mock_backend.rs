//! Scripted backend for driving the client without a real upstream.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use taskgen_client::GenerativeBackend;
use taskgen_core::{GenerationRequest, GenerationResponse, RawFailure};

/// One scripted backend step.
type Step = Result<GenerationResponse, RawFailure>;

/// A backend that replays a scripted sequence of results.
///
/// Once the script is exhausted the backend answers every call with an echo
/// of the request prompt (or with the configured repeating failure), so
/// tests only script the interesting prefix.
pub struct MockBackend {
    calls: AtomicU32,
    script: Mutex<VecDeque<Step>>,
    repeat_failure: Option<RawFailure>,
    latency: Option<Duration>,
}

impl MockBackend {
    /// A backend that succeeds on every call.
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            calls: AtomicU32::new(0),
            script: Mutex::new(VecDeque::new()),
            repeat_failure: None,
            latency: None,
        }
    }

    /// A backend that replays `steps` before turning healthy.
    #[must_use]
    pub fn scripted(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            ..Self::healthy()
        }
    }

    /// A backend that fails every call with clones of `failure`.
    #[must_use]
    pub fn always_failing(failure: RawFailure) -> Self {
        Self {
            repeat_failure: Some(failure),
            ..Self::healthy()
        }
    }

    /// Add a fixed latency to every call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of calls the backend has served.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn call(&self, request: &GenerationRequest) -> Result<GenerationResponse, RawFailure> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self.script.lock().expect("script lock").pop_front();
        match (next, &self.repeat_failure) {
            (Some(step), _) => step,
            (None, Some(failure)) => Err(failure.clone()),
            (None, None) => Ok(GenerationResponse::new(format!("echo: {}", request.prompt))
                .with_model("mock-model")),
        }
    }
}
