//! # Taskgen Resilience
//!
//! Resilience primitives for the task-generation client:
//! - Multi-tier fixed-window rate limiting with all-or-nothing admission
//! - Total classification of raw upstream failures
//! - Exponential backoff scheduling
//! - Retry execution with per-attempt deadlines

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backoff;
pub mod classify;
pub mod rate_limit;
pub mod retry;

// Re-export main types
pub use backoff::BackoffScheduler;
pub use classify::ErrorClassifier;
pub use rate_limit::{Admission, RateLimiter, TierConfig, TierUsage};
pub use retry::{RetryConfig, RetryExecutor, RetryOutcome};
