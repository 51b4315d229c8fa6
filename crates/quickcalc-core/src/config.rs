use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides `weather.api_key`.
pub const API_KEY_ENV: &str = "QUICKCALC_WEATHER_API_KEY";

/// Largest fraction digit count an f64 can meaningfully carry.
const MAX_FRACTION_DIGITS: u32 = 15;

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

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Weather lookup settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Calculator display settings
    #[serde(default)]
    pub calculator: CalculatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeather API key. Empty means "not configured".
    #[serde(default)]
    pub api_key: String,

    /// Direct geocoding endpoint
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// Current weather endpoint
    #[serde(default = "default_weather_url")]
    pub weather_url: String,

    /// Unit system passed to the weather endpoint
    #[serde(default = "default_units")]
    pub units: String,

    /// Language for condition descriptions
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_geocode_url() -> String {
    "https://api.openweathermap.org/geo/1.0/direct".to_string()
}

fn default_weather_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_units() -> String {
    "imperial".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            geocode_url: default_geocode_url(),
            weather_url: default_weather_url(),
            units: default_units(),
            lang: default_lang(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl WeatherConfig {
    /// True if an API key is present
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Fraction digits kept when a result is not an integer
    #[serde(default = "default_fraction_digits")]
    pub fraction_digits: u32,
}

fn default_fraction_digits() -> u32 {
    8
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            fraction_digits: default_fraction_digits(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults there if missing.
    ///
    /// The API key environment override is applied after reading.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?
        } else {
            tracing::info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            config
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                tracing::debug!("Using weather API key from {}", API_KEY_ENV);
                config.weather.api_key = key;
            }
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::load()?.into_validated()
    }

    /// Validate an already loaded configuration, logging any warnings.
    pub fn into_validated(self) -> Result<(Self, ValidationResult)> {
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

        self.validate_url(&self.weather.geocode_url, "weather.geocode_url", &mut result);
        self.validate_url(&self.weather.weather_url, "weather.weather_url", &mut result);

        if !self.weather.is_configured() {
            result.add_warning(
                "weather.api_key",
                format!(
                    "Weather API key not configured - set it in config.toml or {}",
                    API_KEY_ENV
                ),
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.weather.request_timeout_secs > 120 {
            result.add_warning(
                "weather.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if self.calculator.fraction_digits > MAX_FRACTION_DIGITS {
            result.add_error(
                "calculator.fraction_digits",
                format!("Fraction digits cannot exceed {}", MAX_FRACTION_DIGITS),
            );
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

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("quickcalc");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Missing API key is only a warning
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert!(result.warnings.iter().any(|w| w.field == "weather.api_key"));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.weather.geocode_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.geocode_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.weather.weather_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = Config::default();
        config.weather.request_timeout_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_fraction_digits_limit() {
        let mut config = Config::default();
        config.calculator.fraction_digits = 16;
        assert!(!config.validate().is_valid());
        config.calculator.fraction_digits = 15;
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_load_from_missing_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.calculator.fraction_digits, 8);
        assert_eq!(config.weather.units, "imperial");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[calculator]\nfraction_digits = 4\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.calculator.fraction_digits, 4);
        assert_eq!(config.weather.lang, "en");
        assert_eq!(config.weather.request_timeout_secs, 10);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.weather.api_key = "abc123".to_string();
        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: Config = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.weather.api_key, "abc123");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[weather\napi_key = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_into_validated_rejects_invalid() {
        let mut config = Config::default();
        config.weather.request_timeout_secs = 0;

        let err = config.into_validated().unwrap_err();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::Invalid(summary)) => {
                assert!(summary.contains("weather.request_timeout_secs"));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_into_validated_keeps_warnings() {
        let (config, validation) = Config::default().into_validated().unwrap();
        assert_eq!(config.calculator.fraction_digits, 8);
        assert!(!validation.warnings.is_empty());
    }
}
