//! Service configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use riskwatch_core::TriggerConfig;

/// Service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Sensor feed settings.
    pub sensor: SensorConfig,
    /// Advisory service settings.
    pub advisory: AdvisoryConfig,
    /// Hourly-aggregate feed settings.
    pub aggregates: AggregatesConfig,
    /// Hazard trigger thresholds.
    pub triggers: TriggerConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// if no file exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Server bind address is valid (host:port format)
    /// - Sensor URL has an http(s) scheme (unless the mock feed is active)
    /// - Poll interval and timeouts are within reasonable bounds
    /// - Advisory URL has an http(s) scheme when the service is enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.sensor.validate());
        errors.extend(self.advisory.validate());
        errors.extend(self.aggregates.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: "bind address cannot be empty".to_string(),
            });
            return errors;
        }

        let parts: Vec<&str> = self.bind.rsplitn(2, ':').collect();
        if parts.len() != 2 {
            errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: format!(
                    "invalid bind address '{}': expected format 'host:port'",
                    self.bind
                ),
            });
        } else {
            match parts[0].parse::<u16>() {
                Ok(0) => {
                    errors.push(ValidationError {
                        field: "server.bind".to_string(),
                        message: "port cannot be 0".to_string(),
                    });
                }
                Err(_) => {
                    errors.push(ValidationError {
                        field: "server.bind".to_string(),
                        message: format!("invalid port '{}': must be a number 1-65535", parts[0]),
                    });
                }
                Ok(_) => {}
            }
        }

        errors
    }
}

/// Minimum poll interval in milliseconds.
pub const MIN_POLL_INTERVAL_MS: u64 = 500;
/// Maximum poll interval in milliseconds (1 hour).
pub const MAX_POLL_INTERVAL_MS: u64 = 3_600_000;

/// Sensor feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Sensor endpoint URL.
    pub url: String,
    /// Use the built-in mock feed instead of the hardware endpoint.
    pub mock: bool,
    /// Poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            url: "http://192.168.10.1/data".to_string(),
            mock: false,
            poll_interval_ms: 2000,
            request_timeout_ms: 2000,
        }
    }
}

impl SensorConfig {
    /// Validate sensor configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !self.mock && !has_http_scheme(&self.url) {
            errors.push(ValidationError {
                field: "sensor.url".to_string(),
                message: format!(
                    "sensor URL '{}' must start with http:// or https://",
                    self.url
                ),
            });
        }

        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            errors.push(ValidationError {
                field: "sensor.poll_interval_ms".to_string(),
                message: format!(
                    "poll interval {} ms is too short (minimum {} ms)",
                    self.poll_interval_ms, MIN_POLL_INTERVAL_MS
                ),
            });
        } else if self.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            errors.push(ValidationError {
                field: "sensor.poll_interval_ms".to_string(),
                message: format!(
                    "poll interval {} ms is too long (maximum {} ms / 1 hour)",
                    self.poll_interval_ms, MAX_POLL_INTERVAL_MS
                ),
            });
        }

        if self.request_timeout_ms == 0 {
            errors.push(ValidationError {
                field: "sensor.request_timeout_ms".to_string(),
                message: "request timeout cannot be 0".to_string(),
            });
        }

        errors
    }
}

/// Minimum advisory timeout in milliseconds.
pub const MIN_ADVISORY_TIMEOUT_MS: u64 = 100;
/// Maximum advisory timeout in milliseconds.
pub const MAX_ADVISORY_TIMEOUT_MS: u64 = 30_000;

/// Advisory service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Advisory service endpoint.
    pub url: String,
    /// API key appended to requests.
    pub api_key: String,
    /// Hard deadline for one advisory round trip, in milliseconds.
    pub timeout_ms: u64,
    /// Consult the live service. When false every advisory uses the local
    /// fallback text.
    pub enabled: bool,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
                .to_string(),
            api_key: String::new(),
            timeout_ms: 2000,
            enabled: true,
        }
    }
}

impl AdvisoryConfig {
    /// Validate advisory configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.enabled && !has_http_scheme(&self.url) {
            errors.push(ValidationError {
                field: "advisory.url".to_string(),
                message: format!(
                    "advisory URL '{}' must start with http:// or https://",
                    self.url
                ),
            });
        }

        if self.timeout_ms < MIN_ADVISORY_TIMEOUT_MS {
            errors.push(ValidationError {
                field: "advisory.timeout_ms".to_string(),
                message: format!(
                    "advisory timeout {} ms is too short (minimum {} ms)",
                    self.timeout_ms, MIN_ADVISORY_TIMEOUT_MS
                ),
            });
        } else if self.timeout_ms > MAX_ADVISORY_TIMEOUT_MS {
            errors.push(ValidationError {
                field: "advisory.timeout_ms".to_string(),
                message: format!(
                    "advisory timeout {} ms is too long (maximum {} ms)",
                    self.timeout_ms, MAX_ADVISORY_TIMEOUT_MS
                ),
            });
        }

        errors
    }
}

/// Hourly-aggregate feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatesConfig {
    /// Base URL of the aggregate backend.
    pub url: String,
}

impl Default for AggregatesConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

impl AggregatesConfig {
    /// Validate aggregate feed configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !has_http_scheme(&self.url) {
            errors.push(ValidationError {
                field: "aggregates.url".to_string(),
                message: format!(
                    "aggregates URL '{}' must start with http:// or https://",
                    self.url
                ),
            });
        }

        errors
    }
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `sensor.url`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("riskwatch")
        .join("service.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.sensor.poll_interval_ms, 2000);
        assert_eq!(config.advisory.timeout_ms, 2000);
    }

    #[test]
    fn full_toml_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("service.toml");

        let mut config = Config::default();
        config.server.bind = "0.0.0.0:9090".to_string();
        config.sensor.mock = true;
        config.sensor.poll_interval_ms = 5000;
        config.advisory.api_key = "secret".to_string();
        config.triggers.co2_delta_ppm = 75;

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded.server.bind, "0.0.0.0:9090");
        assert!(loaded.sensor.mock);
        assert_eq!(loaded.sensor.poll_interval_ms, 5000);
        assert_eq!(loaded.advisory.api_key, "secret");
        assert_eq!(loaded.triggers.co2_delta_ppm, 75);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
            [sensor]
            mock = true
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.sensor.mock);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.triggers.temperature_critical_c, 30.0);
    }

    #[test]
    fn load_nonexistent_file_fails() {
        let result = Config::load("/nonexistent/path/service.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn load_invalid_toml_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn bind_address_validation() {
        let mut config = ServerConfig::default();
        assert!(config.validate().is_empty());

        config.bind = "127.0.0.1".to_string();
        assert_eq!(config.validate().len(), 1);

        config.bind = "127.0.0.1:0".to_string();
        assert!(config.validate()[0].message.contains("cannot be 0"));

        config.bind = "127.0.0.1:abc".to_string();
        assert!(config.validate()[0].message.contains("must be a number"));

        config.bind = String::new();
        assert!(config.validate()[0].message.contains("cannot be empty"));
    }

    #[test]
    fn sensor_url_required_unless_mock() {
        let mut config = SensorConfig {
            url: "192.168.10.1/data".to_string(),
            ..SensorConfig::default()
        };
        assert_eq!(config.validate().len(), 1);

        config.mock = true;
        assert!(config.validate().is_empty());
    }

    #[test]
    fn poll_interval_bounds() {
        let mut config = SensorConfig::default();

        config.poll_interval_ms = 100;
        assert!(config.validate()[0].message.contains("too short"));

        config.poll_interval_ms = 7_200_000;
        assert!(config.validate()[0].message.contains("too long"));

        config.poll_interval_ms = 2000;
        assert!(config.validate().is_empty());
    }

    #[test]
    fn advisory_timeout_bounds() {
        let mut config = AdvisoryConfig::default();

        config.timeout_ms = 10;
        assert!(config.validate()[0].message.contains("too short"));

        config.timeout_ms = 60_000;
        assert!(config.validate()[0].message.contains("too long"));
    }

    #[test]
    fn disabled_advisory_skips_url_check() {
        let config = AdvisoryConfig {
            url: "not-a-url".to_string(),
            enabled: false,
            ..AdvisoryConfig::default()
        };
        assert!(config.validate().is_empty());
    }

    #[test]
    fn validation_collects_all_errors() {
        let mut config = Config::default();
        config.server.bind = "bad".to_string();
        config.sensor.url = "bad".to_string();
        config.aggregates.url = "bad".to_string();

        let result = config.validate();
        let Err(ConfigError::Validation(errors)) = result else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn validation_error_display() {
        let error = ValidationError {
            field: "sensor.url".to_string(),
            message: "invalid scheme".to_string(),
        };
        assert_eq!(format!("{}", error), "sensor.url: invalid scheme");
    }

    #[test]
    fn default_config_path_ends_with_service_toml() {
        let path = default_config_path();
        assert!(path.ends_with("riskwatch/service.toml"));
    }
}
