//! # Taskgen Client
//!
//! The resilient entry point into the external generative service.
//!
//! [`GenerativeClient`] composes the rate limiter and retry executor around
//! a pluggable [`GenerativeBackend`]; the surrounding API layer calls
//! [`GenerativeClient::invoke`] and receives a terminal success or a
//! classified failure. The client never interprets payloads or results.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod client;

// Re-export commonly used types
pub use backend::GenerativeBackend;
pub use client::{GenerativeClient, GenerativeClientBuilder};
