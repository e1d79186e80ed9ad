//! The underlying-call boundary.

use async_trait::async_trait;
use taskgen_core::{GenerationRequest, GenerationResponse, RawFailure};

/// A single call into the external generative service.
///
/// Implementations are supplied by the surrounding layer and must be safe
/// to invoke multiple times with the same request: retries re-invoke the
/// call verbatim. A failure is reported as the raw status/code/message
/// triple; classification happens in the resilience layer.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Execute one call against the external service.
    async fn call(&self, request: &GenerationRequest) -> Result<GenerationResponse, RawFailure>;
}
