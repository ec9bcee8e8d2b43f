//! Campaign Keyword Matcher Library

pub mod admin;
pub mod campaign;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod matching;
pub mod observability;

pub use campaign::{CampaignCache, CampaignError};
pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use matching::{Classification, MatchOptions, Matcher};
