//! Configuration loading for the relay.
//!
//! Configuration is loaded from a TOML file (default: `relay.toml`). Every
//! section and field is optional and falls back to the defaults below.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration for the relay.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Device table configuration.
    #[serde(default)]
    pub devices: DevicesConfig,
    /// Rate limiting configuration.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Cleanup task configuration.
    #[serde(default)]
    pub cleanup: CleanupConfig,
    /// Usage-event log configuration.
    #[serde(default)]
    pub events: EventsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server (default: 0.0.0.0:10000).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Enable metrics endpoint (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

/// Device table configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DevicesConfig {
    /// Seconds without register/poll before a device is evicted (default: 86400).
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,
    /// Minimum accepted device_id length in characters (default: 1).
    ///
    /// Deployments that only serve UUID device IDs can raise this to 8.
    #[serde(default = "default_min_device_id_len")]
    pub min_device_id_len: usize,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum command submissions per device per minute (default: 30).
    #[serde(default = "default_commands_per_minute")]
    pub commands_per_minute: u32,
    /// Maximum registrations per device per minute (default: 10).
    #[serde(default = "default_registrations_per_minute")]
    pub registrations_per_minute: u32,
    /// Maximum protocol requests per second across all clients (default: 1000).
    #[serde(default = "default_global_requests_per_second")]
    pub global_requests_per_second: u32,
}

/// Cleanup task configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    /// Cleanup interval in seconds (default: 3600 = 1 hour).
    #[serde(default = "default_cleanup_interval")]
    pub interval_secs: u64,
    /// Enable cleanup task (default: true).
    #[serde(default = "default_cleanup_enabled")]
    pub enabled: bool,
}

/// Usage-event log configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Append accepted events to `log_path` (default: true).
    #[serde(default = "default_events_enabled")]
    pub enabled: bool,
    /// JSON-lines file receiving usage events (default: events.log).
    #[serde(default = "default_events_log_path")]
    pub log_path: PathBuf,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0:10000".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_expiry_secs() -> u64 {
    24 * 60 * 60 // 1 day
}

fn default_min_device_id_len() -> usize {
    1
}

fn default_commands_per_minute() -> u32 {
    30
}

fn default_registrations_per_minute() -> u32 {
    10
}

fn default_global_requests_per_second() -> u32 {
    1000
}

fn default_cleanup_interval() -> u64 {
    3600 // 1 hour
}

fn default_cleanup_enabled() -> bool {
    true
}

fn default_events_enabled() -> bool {
    true
}

fn default_events_log_path() -> PathBuf {
    PathBuf::from("events.log")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            expiry_secs: default_expiry_secs(),
            min_device_id_len: default_min_device_id_len(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            commands_per_minute: default_commands_per_minute(),
            registrations_per_minute: default_registrations_per_minute(),
            global_requests_per_second: default_global_requests_per_second(),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_cleanup_interval(),
            enabled: default_cleanup_enabled(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: default_events_enabled(),
            log_path: default_events_log_path(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a
    /// rate limit is configured as zero.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("limits.commands_per_minute", self.limits.commands_per_minute),
            (
                "limits.registrations_per_minute",
                self.limits.registrations_per_minute,
            ),
            (
                "limits.global_requests_per_second",
                self.limits.global_requests_per_second,
            ),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero",
                });
            }
        }
        if self.cleanup.enabled && self.cleanup.interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "cleanup.interval_secs",
                reason: "must be greater than zero when cleanup is enabled",
            });
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}
