use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Configuration errors raised while reading the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid setting {field}: {message}")]
    Invalid { field: String, message: String },
}

/// One validation finding (error or warning).
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

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Short-term forecast provider settings.
///
/// The API key is optional: without it the forecast section of the response
/// degrades to `null`, the process still starts.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Historical climate data provider settings.
#[derive(Debug, Clone)]
pub struct HistoricalConfig {
    pub base_url: String,
}

/// Regression model artifact settings.
#[derive(Debug, Clone)]
pub struct ModelsConfig {
    /// Directory holding one JSON artifact per target variable.
    pub dir: PathBuf,
}

/// Gateway configuration, sourced entirely from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub forecast: ForecastConfig,
    pub historical: HistoricalConfig,
    pub models: ModelsConfig,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FORECAST_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_HISTORICAL_BASE_URL: &str = "https://power.larc.nasa.gov";
const DEFAULT_MODEL_DIR: &str = "models";

impl Config {
    /// Build the configuration from environment variables, applying defaults
    /// for everything except the forecast API key (which has none).
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                field: "PORT".to_string(),
                message: e.to_string(),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let api_key = env::var("OPENWEATHER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let forecast_base_url = env::var("OPENWEATHER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_FORECAST_BASE_URL.to_string());
        let historical_base_url = env::var("POWER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_HISTORICAL_BASE_URL.to_string());

        let model_dir = env::var("MODEL_DIR").unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            forecast: ForecastConfig {
                api_key,
                base_url: forecast_base_url,
            },
            historical: HistoricalConfig {
                base_url: historical_base_url,
            },
            models: ModelsConfig {
                dir: PathBuf::from(model_dir),
            },
        })
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    /// A missing forecast API key is a warning (the feature degrades),
    /// never an error.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.forecast.base_url, "OPENWEATHER_BASE_URL", &mut result);
        self.validate_url(&self.historical.base_url, "POWER_BASE_URL", &mut result);

        if self.server.port == 0 {
            result.add_error("PORT", "Port cannot be 0");
        }

        if self.forecast.api_key.is_none() {
            result.add_warning(
                "OPENWEATHER_API_KEY",
                "Forecast API key not set - short-term forecast will be unavailable",
            );
        }

        if !self.models.dir.is_dir() {
            result.add_warning(
                "MODEL_DIR",
                format!(
                    "Model directory does not exist: {} - ML predictions will be unavailable",
                    self.models.dir.display()
                ),
            );
        }

        result
    }

    /// Validate a URL field
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
}
