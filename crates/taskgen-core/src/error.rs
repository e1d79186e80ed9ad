//! Classified errors and raw upstream failures.
//!
//! Every failure that leaves this workspace is an [`InvokeError`] carrying
//! exactly one [`ErrorKind`]; the kind alone determines retry eligibility.

use std::time::Duration;
use thiserror::Error;

/// Result type for invocation operations.
pub type InvokeResult<T> = std::result::Result<T, InvokeError>;

/// The fixed set of failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A local or upstream quota was exhausted.
    RateLimited,
    /// A transient upstream or network fault.
    Retryable,
    /// Malformed caller input; never retried.
    ClientError,
    /// Unclassified or unexpected failure; never retried.
    Fatal,
}

impl ErrorKind {
    /// Whether errors of this kind are eligible for retry.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::Retryable)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RateLimited => "rate_limited",
            Self::Retryable => "retryable",
            Self::ClientError => "client_error",
            Self::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// A failure classified into one of the fixed kinds.
///
/// Produced by the classifier, consumed by the retry executor, and surfaced
/// to the caller when terminal. The variant is the classification; the
/// message and status hint preserve the original diagnostic context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// A local or upstream quota was exhausted.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Human-readable description of the exhausted quota.
        message: String,
        /// How long to wait before the quota resets, when known.
        retry_after: Option<Duration>,
        /// HTTP status equivalent, when one applies.
        status_hint: Option<u16>,
    },

    /// A transient upstream or network fault.
    #[error("transient upstream failure: {message}")]
    Retryable {
        /// Description of the transient fault.
        message: String,
        /// HTTP status equivalent, when one applies.
        status_hint: Option<u16>,
    },

    /// Malformed caller input.
    #[error("invalid request: {message}")]
    Client {
        /// Description of what was malformed or missing.
        message: String,
        /// HTTP status equivalent, when one applies.
        status_hint: Option<u16>,
    },

    /// Unclassified or unexpected failure.
    #[error("fatal error: {message}")]
    Fatal {
        /// Full diagnostic context of the failure.
        message: String,
        /// HTTP status equivalent, when one applies.
        status_hint: Option<u16>,
    },
}

impl InvokeError {
    /// Create a rate-limited error.
    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after,
            status_hint: Some(429),
        }
    }

    /// Create a retryable error.
    pub fn retryable(message: impl Into<String>, status_hint: Option<u16>) -> Self {
        Self::Retryable {
            message: message.into(),
            status_hint,
        }
    }

    /// Create a client error.
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
            status_hint: Some(400),
        }
    }

    /// Create a fatal error.
    pub fn fatal(message: impl Into<String>, status_hint: Option<u16>) -> Self {
        Self::Fatal {
            message: message.into(),
            status_hint,
        }
    }

    /// Get the classification kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Retryable { .. } => ErrorKind::Retryable,
            Self::Client { .. } => ErrorKind::ClientError,
            Self::Fatal { .. } => ErrorKind::Fatal,
        }
    }

    /// Check if the error is eligible for retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Get the original failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::RateLimited { message, .. }
            | Self::Retryable { message, .. }
            | Self::Client { message, .. }
            | Self::Fatal { message, .. } => message,
        }
    }

    /// Get the HTTP status equivalent, if one applies.
    #[must_use]
    pub fn status_hint(&self) -> Option<u16> {
        match self {
            Self::RateLimited { status_hint, .. }
            | Self::Retryable { status_hint, .. }
            | Self::Client { status_hint, .. }
            | Self::Fatal { status_hint, .. } => *status_hint,
        }
    }

    /// Get the retry-after hint, if available.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// A raw failure as reported by the underlying call.
///
/// The status/code/message triple is all the upstream boundary guarantees;
/// classification into an [`InvokeError`] happens in the resilience layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFailure {
    /// HTTP status code, when the failure carries one.
    pub status: Option<u16>,
    /// Machine-readable error code, when the failure carries one.
    pub code: Option<String>,
    /// Human-readable failure message.
    pub message: String,
    /// Upstream retry-after hint, when the failure carries one.
    pub retry_after: Option<Duration>,
}

impl RawFailure {
    /// Well-known code for attempt deadline expiry.
    pub const CODE_TIMEOUT: &'static str = "timeout";
    /// Well-known code for connection-level transport failures.
    pub const CODE_TRANSPORT: &'static str = "transport";

    /// Create a failure from an HTTP status and message.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code: None,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Create a failure carrying only a machine-readable code.
    pub fn coded(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: Some(code.into()),
            message: message.into(),
            retry_after: None,
        }
    }

    /// Create a failure for an attempt that exceeded its deadline.
    pub fn timeout(elapsed: Duration) -> Self {
        Self::coded(
            Self::CODE_TIMEOUT,
            format!("call exceeded deadline after {}ms", elapsed.as_millis()),
        )
    }

    /// Create a failure for a connection-level transport fault.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::coded(Self::CODE_TRANSPORT, message)
    }

    /// Attach an upstream retry-after hint.
    #[must_use]
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }
}

impl std::fmt::Display for RawFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, self.code.as_deref()) {
            (Some(status), _) => write!(f, "HTTP {status}: {}", self.message),
            (None, Some(code)) => write!(f, "{code}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}
