//! Configuration schema definitions.
//!
//! This module defines the service configuration. All types derive Serde
//! traits for deserialization from TOML; every field has a default so an
//! empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::matching::MatchOptions;

/// Root configuration for the keyword matcher service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Keyword file location and reload behavior.
    pub campaigns: CampaignsConfig,

    /// Matching behavior shared by all campaigns.
    pub matching: MatchingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin endpoint settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8050").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8050".to_string(),
        }
    }
}

/// Campaign keyword files.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CampaignsConfig {
    /// Directory holding one `<campaign>.json` per campaign.
    pub keywords_dir: PathBuf,

    /// Settle delay after a file event before evicting, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for CampaignsConfig {
    fn default() -> Self {
        Self {
            keywords_dir: PathBuf::from("keywords"),
            debounce_ms: 100,
        }
    }
}

/// Matching configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Stages where a bare "no" falls back to the `dnq` category.
    pub dnq_fallback_stages: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            dnq_fallback_stages: MatchOptions::default().dnq_fallback_stages,
        }
    }
}

impl MatchingConfig {
    pub fn to_options(&self) -> MatchOptions {
        MatchOptions {
            dnq_fallback_stages: self.dnq_fallback_stages.clone(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required by `/admin/*`. Unset leaves them open.
    pub api_key: Option<String>,
}
