use crate::net::NetworkLevel;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Net level names one of the four fixed levels
/// - Delay and data limit are sane numbers
/// - Base url carries a schema
/// - Tag preference and file extension are non-empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if NetworkLevel::from_ordinal(config.net.level).is_none() {
        return Err(ConfigError::ValidationError(format!(
            "net.level must be 0-3, got {}",
            config.net.level
        )));
    }

    if !config.net.request_delay_secs.is_finite() || config.net.request_delay_secs < 0.0 {
        return Err(ConfigError::ValidationError(
            "net.request_delay_secs must be a non-negative number".to_string(),
        ));
    }

    if !config.net.data_limit_mb.is_finite() || config.net.data_limit_mb < 0.0 {
        return Err(ConfigError::ValidationError(
            "net.data_limit_mb must be a non-negative number".to_string(),
        ));
    }

    if !config.api.base_url.starts_with("http://") && !config.api.base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url must be prefixed with schema (https/http), got {:?}",
            config.api.base_url
        )));
    }

    if config.harvest.tag_preference.is_empty() {
        return Err(ConfigError::ValidationError(
            "harvest.tag_preference cannot be empty".to_string(),
        ));
    }

    if config.harvest.file_extension.is_empty() {
        return Err(ConfigError::ValidationError(
            "harvest.file_extension cannot be empty".to_string(),
        ));
    }

    Ok(())
}
