//! Configuration management for the image ingest function.
//!
//! Settings are layered: built-in defaults, then optional config files, then
//! environment variables prefixed with `IMAGE_INGEST`.

use crate::object_key::KeyTimezone;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration for the ingest function.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Object storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Inbound event handling
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Object key generation
    #[serde(default)]
    pub keys: KeysConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging
    #[serde(default = "default_service_name")]
    pub name: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// S3 storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Destination bucket for uploaded images
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,
    /// AWS region; the SDK provider chain is used when unset
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint URL (for MinIO, LocalStack, etc.)
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Force path-style access (required for MinIO)
    #[serde(default)]
    pub force_path_style: bool,
}

/// Inbound event handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Event field holding the Base64 image
    #[serde(default = "default_payload_field")]
    pub payload_field: String,
    /// Log the inbound event including the full image payload
    #[serde(default)]
    pub log_full_event: bool,
}

/// Object key generation configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeysConfig {
    /// Timezone of the timestamp embedded in the key
    #[serde(default)]
    pub timezone: KeyTimezone,
    /// Append a random suffix so keys generated within one second differ
    #[serde(default)]
    pub unique_suffix: bool,
    /// Optional key prefix, e.g. "cameras/front-door"
    #[serde(default)]
    pub prefix: Option<String>,
}

// Default value functions
fn default_service_name() -> String {
    "image-ingest".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_bucket_name() -> String {
    "my-espcam-images".to_string()
}

fn default_payload_field() -> String {
    "picture".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket_name: default_bucket_name(),
            region: None,
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            payload_field: default_payload_field(),
            log_full_event: false,
        }
    }
}

impl Config {
    /// Load configuration from config files and environment variables.
    ///
    /// Later sources override earlier ones:
    /// 1. `config/image-ingest.{toml,yaml,json}`
    /// 2. `/etc/image-ingest/image-ingest.{toml,yaml,json}`
    /// 3. Environment variables, e.g. `IMAGE_INGEST__STORAGE__BUCKET_NAME`
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(File::with_name("config/image-ingest").required(false))
            .add_source(File::with_name("/etc/image-ingest/image-ingest").required(false))
            .add_source(
                Environment::with_prefix("IMAGE_INGEST")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    /// Build configuration from an arbitrary set of sources.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.ingest.payload_field.trim().is_empty() {
            return Err(ConfigValidationError::MissingField(
                "ingest.payload_field".to_string(),
            ));
        }

        validate_bucket_name(&self.storage.bucket_name)?;

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(ConfigValidationError::InvalidValue {
                field: "logging.format".to_string(),
                message: format!("unknown format '{}', expected json or pretty", self.logging.format),
            });
        }

        Ok(())
    }
}

/// S3 bucket naming rules: 3-63 chars of `a-z`, `0-9`, `.` and `-`,
/// beginning and ending with a letter or digit.
fn validate_bucket_name(name: &str) -> Result<(), ConfigValidationError> {
    if name.is_empty() {
        return Err(ConfigValidationError::MissingField(
            "storage.bucket_name".to_string(),
        ));
    }

    let invalid = |message: &str| ConfigValidationError::InvalidValue {
        field: "storage.bucket_name".to_string(),
        message: message.to_string(),
    };

    if !(3..=63).contains(&name.len()) {
        return Err(invalid("must be between 3 and 63 characters"));
    }

    if !name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
    {
        return Err(invalid(
            "may only contain lowercase letters, digits, dots and hyphens",
        ));
    }

    let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if !edge_ok(name.chars().next()) || !edge_ok(name.chars().last()) {
        return Err(invalid("must begin and end with a letter or digit"));
    }

    Ok(())
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Config {
        let builder = config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        Config::from_builder(builder).unwrap()
    }

    #[test]
    fn test_default_values() {
        let config = from_toml("");
        assert_eq!(config.service.name, "image-ingest");
        assert_eq!(config.storage.bucket_name, "my-espcam-images");
        assert_eq!(config.ingest.payload_field, "picture");
        assert!(!config.ingest.log_full_event);
        assert_eq!(config.keys.timezone, KeyTimezone::Local);
        assert!(!config.keys.unique_suffix);
        assert!(config.storage.region.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_from_file() {
        let config = from_toml(
            r#"
            [storage]
            bucket_name = "factory-cam-snapshots"
            region = "eu-west-1"
            force_path_style = true

            [ingest]
            payload_field = "image"

            [keys]
            timezone = "utc"
            unique_suffix = true
            prefix = "cameras/dock-3"
            "#,
        );

        assert_eq!(config.storage.bucket_name, "factory-cam-snapshots");
        assert_eq!(config.storage.region.as_deref(), Some("eu-west-1"));
        assert!(config.storage.force_path_style);
        assert_eq!(config.ingest.payload_field, "image");
        assert_eq!(config.keys.timezone, KeyTimezone::Utc);
        assert!(config.keys.unique_suffix);
        assert_eq!(config.keys.prefix.as_deref(), Some("cameras/dock-3"));
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let builder = config::Config::builder()
            .add_source(File::from_str("[keys]\ntimezone = \"mars\"", FileFormat::Toml));
        assert!(Config::from_builder(builder).is_err());
    }

    #[test]
    fn test_empty_payload_field() {
        let mut config = Config::default();
        config.ingest.payload_field = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::MissingField(_))
        ));
    }

    #[test]
    fn test_missing_bucket_name() {
        let mut config = Config::default();
        config.storage.bucket_name = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::MissingField(_))
        ));
    }

    #[test]
    fn test_invalid_bucket_names() {
        let too_long = "a".repeat(64);
        for name in ["ab", "My-Bucket", "bucket_name", "-bucket", "bucket.", too_long.as_str()] {
            let mut config = Config::default();
            config.storage.bucket_name = name.to_string();
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigValidationError::InvalidValue { .. })
                ),
                "expected '{name}' to be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidValue { .. })
        ));
    }
}
