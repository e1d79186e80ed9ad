//! # Taskgen Telemetry
//!
//! Structured logging for the task-generation client.
//!
//! Initialization happens once at process start; every component then logs
//! through `tracing` with structured fields.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;

// Re-export main types
pub use logging::{init_logging, LoggingConfig, TelemetryError};
