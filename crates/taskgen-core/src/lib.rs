//! # Taskgen Core
//!
//! Core types and error handling for the resilient task-generation client.
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Operation kinds and request/response payloads
//! - The classified error taxonomy that drives retry decisions
//! - Raw upstream failures as reported by the underlying call
//! - Terminal invocation outcomes with attempt accounting

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use error::{ErrorKind, InvokeError, InvokeResult, RawFailure};
pub use request::{GenerationRequest, OperationKind, TIER_DAILY, TIER_HOURLY};
pub use response::{GenerationResponse, Invocation};
