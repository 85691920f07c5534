//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (default provider exists and is enabled)
//! - Validate value ranges (timeouts > 0, attempts >= 1, multiplier > 1.0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: ClientConfig → Result<(), Vec<ValidationError>>

use url::Url;

use crate::config::schema::ClientConfig;

/// One semantic violation found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("default_provider must be specified")]
    MissingDefaultProvider,

    #[error("default provider '{0}' not found in providers")]
    UnknownDefaultProvider(String),

    #[error("provider '{0}': base_url is required")]
    MissingBaseUrl(String),

    #[error("provider '{name}': base_url is not a valid URL: {url}")]
    InvalidBaseUrl { name: String, url: String },

    #[error("provider '{0}': timeout must be positive")]
    NonPositiveTimeout(String),

    #[error("provider '{0}': session_ttl must be positive")]
    NonPositiveSessionTtl(String),

    #[error("retry.max_attempts must be at least 1")]
    ZeroMaxAttempts,

    #[error("retry.multiplier must be greater than 1.0")]
    MultiplierTooSmall,
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.default_provider.is_empty() {
        errors.push(ValidationError::MissingDefaultProvider);
    } else if !config.providers.contains_key(&config.default_provider) {
        errors.push(ValidationError::UnknownDefaultProvider(
            config.default_provider.clone(),
        ));
    }

    for (name, provider) in &config.providers {
        if !provider.enabled {
            continue;
        }

        if provider.base_url.is_empty() {
            errors.push(ValidationError::MissingBaseUrl(name.clone()));
        } else if Url::parse(&provider.base_url).is_err() {
            errors.push(ValidationError::InvalidBaseUrl {
                name: name.clone(),
                url: provider.base_url.clone(),
            });
        }

        if provider.timeout_secs == 0 {
            errors.push(ValidationError::NonPositiveTimeout(name.clone()));
        }

        if provider.session_ttl_secs == 0 {
            errors.push(ValidationError::NonPositiveSessionTtl(name.clone()));
        }
    }

    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::ZeroMaxAttempts);
    }

    if config.retry.multiplier <= 1.0 {
        errors.push(ValidationError::MultiplierTooSmall);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
