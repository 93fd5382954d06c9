use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

const APP_DIR: &str = "macau-weather";
const CONFIG_FILE: &str = "config.toml";

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

    /// Join all errors into one line for logs and error values
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
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Upstream SMG feed settings
    #[serde(default)]
    pub feeds: FeedsConfig,
}

/// Upstream feed endpoints and fetch behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    /// Hourly observations ("整點實況")
    pub realtime_url: String,

    /// Today's forecast and weather situation
    pub today_forecast_url: String,

    /// Seven-day forecast RSS
    pub seven_day_url: String,

    /// Typhoon bulletin (reserved, not extracted)
    pub typhoon_url: String,

    /// How long a realtime payload may be reused, in minutes
    pub realtime_ttl_minutes: u32,

    /// Hard timeout for a single fetch, in seconds
    pub timeout_secs: u64,

    /// User-Agent sent with every fetch
    pub user_agent: String,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            realtime_url: "https://xml.smg.gov.mo/c_actual_brief.xml".to_string(),
            today_forecast_url: "https://xml.smg.gov.mo/c_forecast.xml".to_string(),
            seven_day_url: "https://rss.smg.gov.mo/c_WForecast7days_rss.xml".to_string(),
            typhoon_url: "https://xml.smg.gov.mo/c_typhoon.xml".to_string(),
            realtime_ttl_minutes: 30,
            timeout_secs: 10,
            user_agent: concat!("macau-weather/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        Self {
            config_dir,
            feeds: FeedsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, writing defaults there if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; any error fails the load.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::load()?.validated()
    }

    /// Validate an already loaded configuration, failing on any error
    pub fn validated(self) -> Result<(Self, ValidationResult)> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((self, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        let feeds = &self.feeds;

        self.validate_url(&feeds.realtime_url, "feeds.realtime_url", &mut result);
        self.validate_url(
            &feeds.today_forecast_url,
            "feeds.today_forecast_url",
            &mut result,
        );
        self.validate_url(&feeds.seven_day_url, "feeds.seven_day_url", &mut result);
        self.validate_url(&feeds.typhoon_url, "feeds.typhoon_url", &mut result);

        if feeds.timeout_secs == 0 {
            result.add_error("feeds.timeout_secs", "Fetch timeout must be greater than 0");
        } else if feeds.timeout_secs > 120 {
            result.add_warning(
                "feeds.timeout_secs",
                "Fetch timeout is unusually long (>120 seconds)",
            );
        }

        if feeds.realtime_ttl_minutes == 0 {
            result.add_warning(
                "feeds.realtime_ttl_minutes",
                "Realtime caching disabled (0 minutes)",
            );
        } else if feeds.realtime_ttl_minutes > 1440 {
            result.add_warning(
                "feeds.realtime_ttl_minutes",
                "Realtime cache lifetime is more than 24 hours",
            );
        }

        if feeds.user_agent.trim().is_empty() {
            result.add_warning("feeds.user_agent", "Empty User-Agent header");
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

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join(APP_DIR);

        Ok(config_dir.join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_default_feed_endpoints() {
        let feeds = FeedsConfig::default();
        assert_eq!(feeds.realtime_url, "https://xml.smg.gov.mo/c_actual_brief.xml");
        assert_eq!(feeds.seven_day_url, "https://rss.smg.gov.mo/c_WForecast7days_rss.xml");
        assert_eq!(feeds.realtime_ttl_minutes, 30);
        assert_eq!(feeds.timeout_secs, 10);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.feeds.realtime_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "feeds.realtime_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.feeds.seven_day_url = "ftp://rss.smg.gov.mo/feed.xml".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = Config::default();
        config.feeds.timeout_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "feeds.timeout_secs"));
    }

    #[test]
    fn test_zero_ttl_is_warning() {
        let mut config = Config::default();
        config.feeds.realtime_ttl_minutes = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "feeds.realtime_ttl_minutes"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        assert_eq!(result.error_summary(), "field1: error1; field2: error2");
    }

    #[test]
    fn test_load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.feeds, FeedsConfig::default());
        assert_eq!(config.config_dir, dir.path());
    }

    #[test]
    fn test_load_from_fills_missing_feed_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "config_dir = \"/tmp/mw\"\n\n[feeds]\nrealtime_ttl_minutes = 5\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.feeds.realtime_ttl_minutes, 5);
        assert_eq!(config.feeds.timeout_secs, 10);
        assert_eq!(config.config_dir, PathBuf::from("/tmp/mw"));
    }

    #[test]
    fn test_load_from_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_dir = [unterminated").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        assert!(matches!(
            ConfigError::find_in(&err),
            Some(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validated_rejects_invalid_config() {
        let mut config = Config::default();
        config.feeds.timeout_secs = 0;

        let err = config.validated().unwrap_err();
        let config_err = ConfigError::find_in(&err).unwrap();
        assert!(matches!(config_err, ConfigError::Invalid(_)));
        assert_eq!(config_err.user_message(), "設定無效，請檢查設定檔。");
    }

    #[test]
    fn test_validated_passes_defaults_through() {
        let (config, validation) = Config::default().validated().unwrap();
        assert!(validation.is_valid());
        assert_eq!(config.feeds, FeedsConfig::default());
    }
}
