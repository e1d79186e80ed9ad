//! Response payloads and terminal invocation outcomes.

use crate::error::{InvokeError, InvokeResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A successful result from the underlying generative service.
///
/// The content is opaque to this layer; interpretation belongs to the
/// surrounding API surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated content.
    pub content: String,
    /// Model identifier reported by the backend, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Backend-specific metadata, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl GenerationResponse {
    /// Create a response from generated content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
            metadata: None,
        }
    }

    /// Attach the reporting model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Attach backend metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Terminal outcome of a resilient invocation.
///
/// Carries the success value or the terminal classified error, together
/// with the number of attempts made so the caller can report it without
/// knowing how the retry loop ran.
#[derive(Debug)]
pub struct Invocation<T> {
    id: Uuid,
    attempts: u32,
    outcome: InvokeResult<T>,
}

impl<T> Invocation<T> {
    /// Create an invocation outcome.
    #[must_use]
    pub fn new(id: Uuid, attempts: u32, outcome: InvokeResult<T>) -> Self {
        Self {
            id,
            attempts,
            outcome,
        }
    }

    /// Unique identifier of this invocation.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of attempts made, including the final one.
    ///
    /// Zero when admission was denied before any attempt.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Borrow the terminal outcome.
    #[must_use]
    pub fn outcome(&self) -> &InvokeResult<T> {
        &self.outcome
    }

    /// Check whether the invocation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Borrow the terminal error, if the invocation failed.
    #[must_use]
    pub fn error(&self) -> Option<&InvokeError> {
        self.outcome.as_ref().err()
    }

    /// Convert into the terminal result, discarding attempt accounting.
    pub fn into_result(self) -> InvokeResult<T> {
        self.outcome
    }
}
