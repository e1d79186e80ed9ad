//! Configuration loading: YAML file plus environment overrides.

use crate::settings::{ConfigError, CoreConfig};
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the config file path.
pub const CONFIG_PATH_VAR: &str = "TASKGEN_CONFIG";

/// Environment override for the log level.
pub const LOG_LEVEL_VAR: &str = "TASKGEN_LOG_LEVEL";

/// Environment override for the retry attempt budget.
pub const MAX_ATTEMPTS_VAR: &str = "TASKGEN_MAX_ATTEMPTS";

/// Environment override for backoff jitter.
pub const JITTER_VAR: &str = "TASKGEN_JITTER";

/// Load and validate the configuration.
///
/// Reads the YAML file named by `TASKGEN_CONFIG` when set (defaults apply
/// otherwise), applies `TASKGEN_*` environment overrides, then validates.
/// Any failure here must abort startup.
///
/// # Errors
/// Returns a [`ConfigError`] when the file is unreadable or unparsable, an
/// override value is unusable, or validation rejects the result.
pub fn load_config() -> Result<CoreConfig, ConfigError> {
    let mut config = match env::var(CONFIG_PATH_VAR) {
        Ok(path) => from_file(&path)?,
        Err(_) => {
            debug!("No {CONFIG_PATH_VAR} set, using built-in defaults");
            CoreConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;

    info!(
        tiers = config.tiers.len(),
        max_attempts = config.retry.max_attempts,
        jitter = config.retry.jitter,
        "Configuration loaded"
    );

    Ok(config)
}

/// Load configuration from a YAML file, without overrides or validation.
///
/// # Errors
/// Returns a [`ConfigError`] when the file is unreadable or unparsable.
pub fn from_file(path: impl AsRef<Path>) -> Result<CoreConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = serde_yaml::from_str(&raw)?;
    debug!(path = %path.display(), "Configuration file parsed");
    Ok(config)
}

/// Apply `TASKGEN_*` environment overrides in place.
fn apply_env_overrides(config: &mut CoreConfig) -> Result<(), ConfigError> {
    if let Ok(level) = env::var(LOG_LEVEL_VAR) {
        config.log_level = level;
    }

    if let Ok(raw) = env::var(MAX_ATTEMPTS_VAR) {
        config.retry.max_attempts = raw.parse().map_err(|_| ConfigError::Env {
            var: MAX_ATTEMPTS_VAR.to_string(),
            message: format!("expected a positive integer, got '{raw}'"),
        })?;
    }

    if let Ok(raw) = env::var(JITTER_VAR) {
        config.retry.jitter = match raw.as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            other => {
                return Err(ConfigError::Env {
                    var: JITTER_VAR.to_string(),
                    message: format!("expected a boolean, got '{other}'"),
                })
            }
        };
    }

    Ok(())
}
