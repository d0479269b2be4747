//! Runtime configuration.
//!
//! Only the knobs that differ between deployments live here. The message
//! table, status map and retry ladder are static (see
//! [`definitions`](crate::definitions)).
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```rust
//! use hireline_errors::config::{ErrorKitConfig, RuntimeMode};
//!
//! let cfg = ErrorKitConfig::from_json(r#"{"mode": "production", "maxLogs": 200}"#).unwrap();
//! assert_eq!(cfg.mode, RuntimeMode::Production);
//! assert_eq!(cfg.max_logs, 200);
//! assert_eq!(cfg.max_breadcrumbs, 50);
//! ```

use crate::factory::create_validation_error;
use crate::models::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether the process runs for developers or for users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Verbose grouped logs, no remote reports.
    Development,
    /// Debounced structured reports.
    Production,
}

impl RuntimeMode {
    /// Development for debug builds, production otherwise.
    pub const fn detect() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// Whether this is [`RuntimeMode::Production`].
    #[inline]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Default for RuntimeMode {
    fn default() -> Self {
        Self::detect()
    }
}

/// Where errors are being logged from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Environment {
    /// Client user agent.
    pub user_agent: String,
    /// Current page or endpoint.
    pub url: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            user_agent: "Server".to_owned(),
            url: "Server".to_owned(),
        }
    }
}

/// Logger and reporter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorKitConfig {
    /// Runtime mode.
    pub mode: RuntimeMode,
    /// History capacity.
    pub max_logs: usize,
    /// Breadcrumb trail length.
    pub max_breadcrumbs: usize,
    /// Duplicate-report window for production reports, in milliseconds.
    pub report_debounce_ms: u64,
    /// Environment stamped on every log entry.
    pub environment: Environment,
}

impl Default for ErrorKitConfig {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::detect(),
            max_logs: crate::ring_buffer::DEFAULT_HISTORY_CAPACITY,
            max_breadcrumbs: 50,
            report_debounce_ms: 5_000,
            environment: Environment::default(),
        }
    }
}

impl ErrorKitConfig {
    /// Parse from JSON. Malformed input becomes a validation error on field
    /// `config`.
    pub fn from_json(input: &str) -> Result<Self, AppError> {
        serde_json::from_str(input)
            .map_err(|e| create_validation_error("config", e.to_string(), None, None))
    }

    /// Builder: set the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: set the environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// [`Self::report_debounce_ms`] as a duration.
    #[inline]
    pub const fn report_debounce(&self) -> Duration {
        Duration::from_millis(self.report_debounce_ms)
    }
}
