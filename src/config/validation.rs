//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and formats
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::matching::category::is_stage_id;

/// Longest accepted settle delay.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("campaigns.keywords_dir must not be empty")]
    EmptyKeywordsDir,

    #[error("campaigns.debounce_ms {0} exceeds 10000")]
    DebounceTooLong(u64),

    #[error("matching.dnq_fallback_stages entry '{0}' is not a stage id (s<digits>)")]
    InvalidStage(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("admin.api_key must not be empty when set")]
    EmptyApiKey,
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.campaigns.keywords_dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyKeywordsDir);
    }

    if config.campaigns.debounce_ms > MAX_DEBOUNCE_MS {
        errors.push(ValidationError::DebounceTooLong(config.campaigns.debounce_ms));
    }

    for stage in &config.matching.dnq_fallback_stages {
        if !is_stage_id(stage) {
            errors.push(ValidationError::InvalidStage(stage.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if matches!(&config.admin.api_key, Some(key) if key.trim().is_empty()) {
        errors.push(ValidationError::EmptyApiKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
