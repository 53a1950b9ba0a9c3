//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `webbrick.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;
use webbrick_adapter_virtual::VirtualBusConfig;
use webbrick_app::DriverConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Driver settings, announced to the platform on start.
    pub driver: DriverConfig,
    /// Simulated bus used in demo mode.
    pub virtual_bus: VirtualBusConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "webbrickd=info,webbrick_app=info,webbrick_adapter_virtual=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `webbrick.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("webbrick.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Setting any driver value from the environment marks the driver
    /// settings as initialised, otherwise the driver would discard them.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("WEBBRICK_DRIVER_NAME") {
            self.driver.name = val;
            self.driver.initialised = true;
        }
        if let Some(minutes) = var("WEBBRICK_POLLING_MINUTES").and_then(|val| val.parse().ok()) {
            self.driver.polling_minutes = minutes;
            self.driver.polling_active = true;
            self.driver.initialised = true;
        }
        if let Some(ms) = var("WEBBRICK_POLL_INTERVAL_MS").and_then(|val| val.parse().ok()) {
            self.virtual_bus.poll_interval_ms = ms;
        }
        if let Some(val) = var("WEBBRICK_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.polling_minutes == 0 {
            return Err(ConfigError::Validation(
                "driver.polling_minutes must be non-zero".to_string(),
            ));
        }
        if self.virtual_bus.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "virtual_bus.poll_interval_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
