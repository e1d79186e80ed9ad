//! Configuration model and validation rules.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskgen_core::request::{TIER_DAILY, TIER_HOURLY};
use taskgen_core::OperationKind;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An environment override carried an unusable value.
    #[error("invalid environment override {var}: {message}")]
    Env {
        /// The offending variable name.
        var: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Validation rejected the assembled configuration.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// Which rule was violated.
        message: String,
    },
}

impl ConfigError {
    /// Create a validation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Retry policy parameters.
///
/// Immutable after startup; shared read-only across all invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    /// Delay before the first retry.
    #[serde(with = "humantime_serde", default = "default_initial_delay")]
    pub initial_delay: Duration,
    /// Upper bound on any single backoff delay.
    #[serde(with = "humantime_serde", default = "default_max_delay")]
    pub max_delay: Duration,
    /// Maximum number of attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff growth factor between attempts.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Whether backoff delays are jittered.
    #[serde(default)]
    pub jitter: bool,
    /// Deadline for a single underlying call.
    #[serde(with = "humantime_serde", default = "default_attempt_timeout")]
    pub attempt_timeout: Duration,
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_max_attempts() -> u32 {
    5
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_attempt_timeout() -> Duration {
    Duration::from_secs(120)
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            max_attempts: default_max_attempts(),
            multiplier: default_multiplier(),
            jitter: false,
            attempt_timeout: default_attempt_timeout(),
        }
    }
}

/// A single quota tier definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierSettings {
    /// Tier name referenced by admission keys.
    pub name: String,
    /// Maximum admitted calls per window.
    pub capacity: u32,
    /// Window length.
    #[serde(with = "humantime_serde")]
    pub window: Duration,
}

impl TierSettings {
    /// Create a tier definition.
    pub fn new(name: impl Into<String>, capacity: u32, window: Duration) -> Self {
        Self {
            name: name.into(),
            capacity,
            window,
        }
    }
}

/// Top-level configuration for the invocation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    /// Retry policy parameters.
    #[serde(default)]
    pub retry: RetrySettings,
    /// Quota tier definitions.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierSettings>,
    /// Log level for the process.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Default quota tiers: 200/day and 50/hour globally, 10/minute per
/// operation kind.
fn default_tiers() -> Vec<TierSettings> {
    let mut tiers = vec![
        TierSettings::new(TIER_DAILY, 200, Duration::from_secs(24 * 60 * 60)),
        TierSettings::new(TIER_HOURLY, 50, Duration::from_secs(60 * 60)),
    ];
    for kind in OperationKind::ALL {
        tiers.push(TierSettings::new(
            kind.tier_key(),
            10,
            Duration::from_secs(60),
        ));
    }
    tiers
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            retry: RetrySettings::default(),
            tiers: default_tiers(),
            log_level: default_log_level(),
        }
    }
}

impl CoreConfig {
    /// Validate the assembled configuration.
    ///
    /// # Errors
    /// Returns the first violated rule. Every rule failure must prevent
    /// startup; callers must not fall back to defaults here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let retry = &self.retry;
        if retry.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts must be at least 1"));
        }
        if retry.multiplier < 1.0 {
            return Err(ConfigError::invalid("retry.multiplier must be at least 1.0"));
        }
        if retry.initial_delay.is_zero() {
            return Err(ConfigError::invalid("retry.initial_delay must be non-zero"));
        }
        if retry.initial_delay > retry.max_delay {
            return Err(ConfigError::invalid(
                "retry.initial_delay must not exceed retry.max_delay",
            ));
        }
        if retry.attempt_timeout.is_zero() {
            return Err(ConfigError::invalid(
                "retry.attempt_timeout must be non-zero",
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for tier in &self.tiers {
            if tier.name.trim().is_empty() {
                return Err(ConfigError::invalid("tier name must be non-empty"));
            }
            if tier.capacity == 0 {
                return Err(ConfigError::invalid(format!(
                    "tier '{}' capacity must be at least 1",
                    tier.name
                )));
            }
            if tier.window.is_zero() {
                return Err(ConfigError::invalid(format!(
                    "tier '{}' window must be non-zero",
                    tier.name
                )));
            }
            if !seen.insert(tier.name.as_str()) {
                return Err(ConfigError::invalid(format!(
                    "duplicate tier '{}'",
                    tier.name
                )));
            }
        }

        for required in Self::required_tier_names() {
            if !seen.contains(required.as_str()) {
                return Err(ConfigError::invalid(format!(
                    "required tier '{required}' is not configured"
                )));
            }
        }

        if self.log_level.trim().is_empty() {
            return Err(ConfigError::invalid("log_level must be non-empty"));
        }

        Ok(())
    }

    /// Names of the tiers every deployment must configure.
    #[must_use]
    pub fn required_tier_names() -> Vec<String> {
        let mut names = vec![TIER_DAILY.to_string(), TIER_HOURLY.to_string()];
        names.extend(OperationKind::ALL.iter().map(|k| k.tier_key().to_string()));
        names
    }

    /// Look up a tier definition by name.
    #[must_use]
    pub fn tier(&self, name: &str) -> Option<&TierSettings> {
        self.tiers.iter().find(|t| t.name == name)
    }
}
