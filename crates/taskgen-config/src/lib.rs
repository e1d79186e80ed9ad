//! # Taskgen Config
//!
//! Startup configuration for the resilient task-generation client.
//!
//! Configuration is loaded exactly once at process start, from a YAML file
//! named by `TASKGEN_CONFIG` plus `TASKGEN_*` environment overrides, and
//! validated before any traffic is accepted. Missing or invalid values fail
//! startup deterministically; nothing defaults silently after validation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod loader;
pub mod settings;

// Re-export commonly used types
pub use loader::{load_config, CONFIG_PATH_VAR};
pub use settings::{ConfigError, CoreConfig, RetrySettings, TierSettings};
