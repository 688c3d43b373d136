use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variable overriding `weather_api.user`.
pub const USER_ENV: &str = "ISUN_API_USER";
/// Environment variable overriding `weather_api.password`.
pub const PASSWORD_ENV: &str = "ISUN_API_PASSWORD";

/// Upper bound accepted for the cache lifetime and the poll interval.
const MAX_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote weather service settings
    #[serde(default)]
    pub weather_api: WeatherApiConfig,

    /// City cache settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Polling settings
    #[serde(default)]
    pub console: ConsoleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherApiConfig {
    /// Base URL of the weather service; `authorize`, `cities` and `weathers` hang off it
    pub base_url: String,

    /// Account name posted to the authorize endpoint
    #[serde(default)]
    pub user: String,

    /// Account password (can be set via environment instead)
    #[serde(default)]
    pub password: String,

    /// Per-request transport timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://weather-api.isun.ch/api/".to_string(),
            user: String::new(),
            password: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl WeatherApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Check if credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }
}

/// A missing section deserializes to unset values; nothing is defaulted silently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Lifetime of the supported-city cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_city_cache_ttl_seconds: Option<u64>,
}

impl ApplicationConfig {
    /// Cache lifetime, or the configuration error that makes it unusable.
    pub fn cache_ttl(&self) -> Result<Duration, ConfigError> {
        required_seconds(
            self.available_city_cache_ttl_seconds,
            "application.available_city_cache_ttl_seconds",
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Delay between two fetch cycles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_between_weather_fetch_seconds: Option<u64>,
}

impl ConsoleConfig {
    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        required_seconds(
            self.delay_between_weather_fetch_seconds,
            "console.delay_between_weather_fetch_seconds",
        )
    }
}

fn required_seconds(value: Option<u64>, field: &str) -> Result<Duration, ConfigError> {
    match value {
        None => Err(ConfigError::MissingSetting(field.to_string())),
        Some(0) => Err(ConfigError::Invalid(format!(
            "{} must be greater than 0",
            field
        ))),
        Some(secs) => Ok(Duration::from_secs(secs)),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weather_api: WeatherApiConfig::default(),
            application: ApplicationConfig {
                available_city_cache_ttl_seconds: Some(300),
            },
            console: ConsoleConfig {
                delay_between_weather_fetch_seconds: Some(15),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file is created with defaults; a missing explicit
    /// path is an error. Credentials from the environment override the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.display().to_string()));
                }
                Self::read(path)?
            }
            None => {
                let default_path = Self::default_path()?;
                if default_path.exists() {
                    Self::read(&default_path)?
                } else {
                    let config = Self::default();
                    if let Err(e) = config.save(&default_path) {
                        tracing::warn!("Could not write default config: {:#}", e);
                    }
                    config
                }
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings, which the
    /// caller logs once its subscriber is installed.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        Ok((config, validation))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Override credentials from the environment (`lookup` is `std::env::var` outside tests).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = lookup(USER_ENV).filter(|v| !v.is_empty()) {
            self.weather_api.user = user;
        }
        if let Some(password) = lookup(PASSWORD_ENV).filter(|v| !v.is_empty()) {
            self.weather_api.password = password;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather_api.base_url, "weather_api.base_url", &mut result);

        if !self.weather_api.has_credentials() {
            result.add_warning(
                "weather_api",
                format!(
                    "Credentials not configured - set them in the file or via {} / {}",
                    USER_ENV, PASSWORD_ENV
                ),
            );
        }

        if self.weather_api.timeout_seconds == 0 {
            result.add_error(
                "weather_api.timeout_seconds",
                "Timeout must be greater than 0",
            );
        }

        match self.application.cache_ttl() {
            Err(e) => {
                result.add_error("application.available_city_cache_ttl_seconds", e.to_string())
            }
            Ok(ttl) if ttl > Duration::from_secs(MAX_SECONDS) => {
                result.add_error(
                    "application.available_city_cache_ttl_seconds",
                    format!("Cache lifetime must be at most {} seconds", MAX_SECONDS),
                );
            }
            Ok(_) => {}
        }

        match self.console.poll_interval() {
            Err(e) => {
                result.add_error("console.delay_between_weather_fetch_seconds", e.to_string())
            }
            Ok(interval) if interval > Duration::from_secs(MAX_SECONDS) => {
                result.add_error(
                    "console.delay_between_weather_fetch_seconds",
                    format!("Poll interval must be at most {} seconds", MAX_SECONDS),
                );
            }
            Ok(interval) if interval > Duration::from_secs(24 * 60 * 60) => {
                result.add_warning(
                    "console.delay_between_weather_fetch_seconds",
                    "Poll interval is more than 24 hours",
                );
            }
            Ok(_) => {}
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the default path of the configuration file
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("user config directory".to_string()))?
            .join("isun");

        Ok(config_dir.join("config.toml"))
    }
}
