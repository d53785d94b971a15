//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse configuration text without validating it.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Read a TOML file without validating it, so overrides can still apply.
pub fn read_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Check a configuration, turning validation failures into a [`ConfigError`].
pub fn check_config(config: &RelayConfig) -> Result<(), ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;

    #[test]
    fn test_parse_full_file() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [downstream]
            base_url = "http://catalog:8001/api/v2/products"

            [limits]
            max_json_body = 1024
            max_upload_size = 10485760

            [observability]
            log_level = "debug"
            log_format = "json"
            metrics_enabled = true
            metrics_address = "127.0.0.1:9100"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.downstream.url().unwrap().host_str(), Some("catalog"));
        assert_eq!(config.limits.max_json_body, 1024);
        assert_eq!(config.limits.max_upload_size, Some(10_485_760));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(check_config(&config).is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("[downstream]\nbase_url = \"http://localhost:1/p\"\n").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.limits.max_upload_size, None);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_unknown_log_format_is_parse_error() {
        let err = parse_config("[observability]\nlog_format = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_display() {
        let mut config = RelayConfig::default();
        config.limits.max_json_body = 0;
        config.listener.bind_address = "nope".to_string();

        let message = check_config(&config).unwrap_err().to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("listener.bind_address `nope`"));
        assert!(message.contains(", limits.max_json_body"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
