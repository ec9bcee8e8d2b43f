//! Campaign loading errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`CampaignCache`](super::CampaignCache) lookups.
///
/// `Unavailable` and `Parse` both mean "campaign not found" to callers; no
/// partial matcher is cached for either.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// Campaign id cannot name a file in the keywords directory.
    #[error("invalid campaign name '{0}'")]
    InvalidName(String),

    /// Keyword file missing or unreadable.
    #[error("campaign '{campaign}' unavailable: failed to read {path}: {source}")]
    Unavailable {
        campaign: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Keyword file is not a JSON object.
    #[error("campaign '{campaign}' unavailable: failed to parse {path}: {source}")]
    Parse {
        campaign: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CampaignError {
    /// Whether the error means the campaign could not be loaded, as opposed
    /// to a malformed request.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CampaignError::Unavailable { .. } | CampaignError::Parse { .. }
        )
    }
}

/// Result alias for campaign operations.
pub type CampaignResult<T> = Result<T, CampaignError>;
