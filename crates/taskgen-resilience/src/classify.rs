//! Total classification of raw upstream failures.

use taskgen_core::{InvokeError, RawFailure};

/// Maps a [`RawFailure`] into exactly one [`InvokeError`] kind.
///
/// The mapping is total: anything that is not recognizably a quota
/// exhaustion, a transient fault, or a caller mistake is `Fatal`, never
/// silently retried.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    /// Status codes that signal quota exhaustion.
    pub rate_limit_status: Vec<u16>,
    /// Case-insensitive code/message markers that signal quota exhaustion.
    pub rate_limit_markers: Vec<String>,
    /// Status codes that are transient and worth retrying.
    pub retry_status: Vec<u16>,
    /// Status codes that indicate malformed caller input.
    pub client_status: Vec<u16>,
    /// Case-insensitive code/message markers for malformed input.
    pub client_markers: Vec<String>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            rate_limit_status: vec![429],
            rate_limit_markers: vec![
                "quota".to_string(),
                "rate limit".to_string(),
                "resource exhausted".to_string(),
            ],
            retry_status: vec![500, 502, 503, 504],
            client_status: vec![400, 404, 413, 422],
            client_markers: vec!["invalid argument".to_string(), "malformed".to_string()],
        }
    }
}

impl ErrorClassifier {
    /// Create a classifier with the default rule sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a raw failure.
    pub fn classify(&self, failure: &RawFailure) -> InvokeError {
        let haystack = Self::haystack(failure);

        // Quota exhaustion wins over the generic 4xx bucket: an upstream
        // 429 is retryable, a 400 is not.
        if failure
            .status
            .is_some_and(|s| self.rate_limit_status.contains(&s))
            || self.matches(&self.rate_limit_markers, &haystack)
        {
            return InvokeError::RateLimited {
                message: failure.message.clone(),
                retry_after: failure.retry_after,
                status_hint: failure.status.or(Some(429)),
            };
        }

        // Attempt deadlines and connection faults carry well-known codes.
        if matches!(
            failure.code.as_deref(),
            Some(RawFailure::CODE_TIMEOUT | RawFailure::CODE_TRANSPORT)
        ) {
            return InvokeError::retryable(failure.message.clone(), failure.status);
        }

        if let Some(status) = failure.status {
            if self.retry_status.contains(&status) || (500..600).contains(&status) {
                return InvokeError::retryable(failure.message.clone(), Some(status));
            }
            if self.client_status.contains(&status) {
                return InvokeError::Client {
                    message: failure.message.clone(),
                    status_hint: Some(status),
                };
            }
        }

        if self.matches(&self.client_markers, &haystack) {
            return InvokeError::Client {
                message: failure.message.clone(),
                status_hint: failure.status,
            };
        }

        // Unrecognized and not explicitly transient: surface immediately
        // with the diagnostic context intact.
        InvokeError::fatal(failure.to_string(), failure.status)
    }

    fn haystack(failure: &RawFailure) -> String {
        let mut text = failure.message.to_lowercase();
        if let Some(code) = &failure.code {
            text.push(' ');
            text.push_str(&code.to_lowercase());
        }
        text
    }

    fn matches(&self, markers: &[String], haystack: &str) -> bool {
        markers.iter().any(|m| haystack.contains(m.as_str()))
    }
}
