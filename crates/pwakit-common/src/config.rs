//! PWA manager configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment override for [`PwaConfig::script_url`].
pub const ENV_SCRIPT_URL: &str = "PWAKIT_SCRIPT_URL";
/// Environment override for [`PwaConfig::scope`].
pub const ENV_SCOPE: &str = "PWAKIT_SCOPE";

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// PWA manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PwaConfig {
    /// Offline worker script, registered at startup
    pub script_url: String,

    /// Registration scope
    pub scope: String,

    /// Buffered notifications per subscriber before old ones are dropped
    pub notification_capacity: usize,

    /// Drop the captured install prompt once the user dismisses it
    pub consume_prompt_on_dismiss: bool,
}

impl Default for PwaConfig {
    fn default() -> Self {
        Self {
            script_url: "/service-worker.js".to_string(),
            scope: "/".to_string(),
            notification_capacity: 64,
            consume_prompt_on_dismiss: false,
        }
    }
}

impl PwaConfig {
    /// Load a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PWAKIT_SCRIPT_URL` / `PWAKIT_SCOPE` if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(script_url) = std::env::var(ENV_SCRIPT_URL) {
            self.script_url = script_url;
        }
        if let Ok(scope) = std::env::var(ENV_SCOPE) {
            self.scope = scope;
        }
        self
    }

    /// Check invariants the manager relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.script_url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "scriptUrl",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.scope.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "scope",
                reason: format!("{:?} is not root-relative", self.scope),
            });
        }
        // broadcast channels panic on zero capacity
        if self.notification_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "notificationCapacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
