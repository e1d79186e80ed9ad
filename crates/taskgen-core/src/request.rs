//! Request payloads for the multi-task generation service.

use crate::error::{InvokeError, InvokeResult};
use serde::{Deserialize, Serialize};

/// The operations exposed by the service.
///
/// Each kind is gated by its own per-minute quota tier in addition to the
/// global tiers; [`OperationKind::tier_key`] names that tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Free-form text generation.
    TextGeneration,
    /// Source-code generation.
    CodeGeneration,
    /// Classification of a text into caller-supplied categories.
    TextClassification,
}

impl OperationKind {
    /// All operation kinds, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::TextGeneration,
        Self::CodeGeneration,
        Self::TextClassification,
    ];

    /// Stable identifier used in logs and configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextGeneration => "text_generation",
            Self::CodeGeneration => "code_generation",
            Self::TextClassification => "text_classification",
        }
    }

    /// Name of the per-operation per-minute quota tier gating this kind.
    #[must_use]
    pub fn tier_key(self) -> &'static str {
        match self {
            Self::TextGeneration => "per_minute:text_generation",
            Self::CodeGeneration => "per_minute:code_generation",
            Self::TextClassification => "per_minute:text_classification",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single generation request.
///
/// The payload is owned exclusively by the request that created it and is
/// passed to the backend uninterpreted; only required-field validation
/// happens here, before any quota is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Which operation this request performs.
    pub operation: OperationKind,
    /// The prompt or input text.
    pub prompt: String,
    /// Candidate categories for classification requests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Sampling temperature override, passed through to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Output token cap, passed through to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationRequest {
    /// Create a text-generation request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            operation: OperationKind::TextGeneration,
            prompt: prompt.into(),
            categories: Vec::new(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Create a code-generation request.
    pub fn code(prompt: impl Into<String>) -> Self {
        Self {
            operation: OperationKind::CodeGeneration,
            ..Self::text(prompt)
        }
    }

    /// Create a classification request for `text` over `categories`.
    pub fn classification(
        text: impl Into<String>,
        categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            operation: OperationKind::TextClassification,
            categories: categories.into_iter().map(Into::into).collect(),
            ..Self::text(text)
        }
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the output token cap.
    #[must_use]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Validate required fields.
    ///
    /// # Errors
    /// Returns a `ClientError`-classified [`InvokeError`] when the prompt is
    /// missing or a classification request carries no categories.
    pub fn validate(&self) -> InvokeResult<()> {
        if self.prompt.trim().is_empty() {
            return Err(InvokeError::client("prompt is required"));
        }
        if self.operation == OperationKind::TextClassification {
            if self.categories.is_empty() {
                return Err(InvokeError::client(
                    "categories are required for classification",
                ));
            }
            if self.categories.iter().any(|c| c.trim().is_empty()) {
                return Err(InvokeError::client("categories must be non-empty"));
            }
        }
        Ok(())
    }

    /// Tier keys gating this request: the global tiers plus the operation
    /// kind's per-minute tier.
    #[must_use]
    pub fn tier_keys(&self) -> [&'static str; 3] {
        [TIER_DAILY, TIER_HOURLY, self.operation.tier_key()]
    }
}

/// Name of the global daily quota tier.
pub const TIER_DAILY: &str = "daily";
/// Name of the global hourly quota tier.
pub const TIER_HOURLY: &str = "hourly";
