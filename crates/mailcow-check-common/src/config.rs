//! Configuration for check_mailcow_rspamd

use crate::types::Thresholds;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_HISTORY_COUNT: u32 = 200;
pub const DEFAULT_MIN_BACK: u64 = 5;
pub const DEFAULT_WARNING_SECS: i64 = 1800;
pub const DEFAULT_CRITICAL_SECS: i64 = 3600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Check configuration
///
/// Command-line flags and environment variables are applied on top of
/// whatever a config file provides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Base URL of the Mailcow instance
    #[serde(default)]
    pub server: Option<String>,

    /// Mailcow API key (read-only access is enough)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Number of history entries to request
    #[serde(default = "default_count")]
    pub count: u32,

    /// Lookback window in minutes for action tallies
    #[serde(default = "default_min_back")]
    pub min_back: u64,

    /// Warning threshold in seconds since the last mail
    #[serde(default = "default_warning")]
    pub warning: i64,

    /// Critical threshold in seconds since the last mail
    #[serde(default = "default_critical")]
    pub critical: i64,

    /// Always exit OK, still reporting metrics
    #[serde(default)]
    pub always_ok: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept invalid TLS certificates
    #[serde(default)]
    pub insecure: bool,

    /// Append 24h traffic statistics as long output
    #[serde(default)]
    pub details: bool,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            server: None,
            api_key: None,
            count: default_count(),
            min_back: default_min_back(),
            warning: default_warning(),
            critical: default_critical(),
            always_ok: false,
            timeout_secs: default_timeout(),
            insecure: false,
            details: false,
            logging: LoggingConfig::default(),
        }
    }
}

fn default_count() -> u32 {
    DEFAULT_HISTORY_COUNT
}

fn default_min_back() -> u64 {
    DEFAULT_MIN_BACK
}

fn default_warning() -> i64 {
    DEFAULT_WARNING_SECS
}

fn default_critical() -> i64 {
    DEFAULT_CRITICAL_SECS
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "json" or "text"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// stdout belongs to the plugin line, keep diagnostics quiet by default
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl CheckConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: CheckConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Load from `path` if given, otherwise start from defaults
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Check that everything needed for a request is present and sane
    pub fn validate(&self) -> crate::Result<()> {
        let server = self
            .server
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| crate::Error::Config("--server is required".to_string()))?;

        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(crate::Error::Validation(format!(
                "server must be an http:// or https:// URL, got '{}'",
                server
            )));
        }

        if self.api_key.as_deref().map_or(true, |k| k.is_empty()) {
            return Err(crate::Error::Config("--apiKey is required".to_string()));
        }

        if self.count == 0 {
            return Err(crate::Error::Validation(
                "count must be greater than zero".to_string(),
            ));
        }

        if self.warning < 0 || self.critical < 0 {
            return Err(crate::Error::Validation(
                "thresholds must not be negative".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(crate::Error::Validation(
                "timeout must be greater than zero".to_string(),
            ));
        }

        if self.warning > self.critical {
            tracing::warn!(
                warning = self.warning,
                critical = self.critical,
                "warning threshold is above critical threshold"
            );
        }

        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.warning, self.critical)
    }
}
