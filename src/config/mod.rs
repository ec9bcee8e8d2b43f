//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! service config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! Campaign keyword files (JSON, one per campaign):
//!     watcher.rs detects create/write in keywords_dir
//!     → settle delay
//!     → CampaignCache::evict
//!     → next lookup reloads from disk
//! ```
//!
//! # Design Decisions
//! - Service config is immutable once loaded; changes require restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Keyword files are the hot-reloaded part, never the service config

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, CampaignsConfig, ListenerConfig, MatchingConfig, ObservabilityConfig,
    ServiceConfig, TimeoutConfig,
};
pub use watcher::{CampaignWatcher, WatchError};
