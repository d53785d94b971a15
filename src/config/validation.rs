//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, the product service URL and size limits
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("downstream.base_url `{url}` is invalid: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("limits.max_json_body must be greater than zero")]
    ZeroJsonLimit,

    #[error("limits.max_upload_size must be greater than zero when set")]
    ZeroUploadLimit,

    #[error("observability.log_level `{0}` is not a log level")]
    LogLevel(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Err(reason) = check_base_url(&config.downstream.base_url) {
        errors.push(ValidationError::BaseUrl {
            url: config.downstream.base_url.clone(),
            reason,
        });
    }

    if config.limits.max_json_body == 0 {
        errors.push(ValidationError::ZeroJsonLimit);
    }
    if config.limits.max_upload_size == Some(0) {
        errors.push(ValidationError::ZeroUploadLimit);
    }

    let observability = &config.observability;
    if observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = url::Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.cannot_be_a_base() {
        return Err("not usable as a base URL".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RelayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "localhost".to_string();
        config.downstream.base_url = "ftp://files.local/products".to_string();
        config.limits.max_json_body = 0;
        config.limits.max_upload_size = Some(0);
        config.observability.log_level = "loud".to_string();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert_eq!(errors[0], ValidationError::BindAddress("localhost".to_string()));
        assert!(errors.contains(&ValidationError::ZeroJsonLimit));
        assert!(errors.contains(&ValidationError::LogLevel("loud".to_string())));
    }

    #[test]
    fn test_base_url_checks() {
        assert!(check_base_url("https://products.internal/api/products").is_ok());
        assert!(check_base_url("not a url").is_err());
        assert!(check_base_url("mailto:ops@example.com").is_err());
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = RelayConfig::default();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
