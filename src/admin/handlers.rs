use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::time::SystemTime;

use crate::campaign::cache::unix_millis;
use crate::campaign::{CacheStats, CampaignSnapshot, EvictReason};
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct ReloadResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    pub evicted: usize,
    pub reloaded_at: u64,
}

#[derive(Serialize)]
pub struct CacheInfo {
    pub cached_campaigns: usize,
    pub campaigns: Vec<CampaignSnapshot>,
    pub stats: CacheStats,
    pub timestamp: u64,
}

pub async fn reload_campaign(
    State(state): State<AppState>,
    Path(campaign): Path<String>,
) -> Json<ReloadResponse> {
    let evicted = state.cache.evict(&campaign, EvictReason::Admin);

    Json(ReloadResponse {
        message: format!(
            "Campaign '{}' cache cleared and will reload on next request",
            campaign
        ),
        campaign: Some(campaign),
        evicted: usize::from(evicted),
        reloaded_at: unix_millis(SystemTime::now()),
    })
}

pub async fn reload_all(State(state): State<AppState>) -> Json<ReloadResponse> {
    let count = state.cache.evict_all();

    Json(ReloadResponse {
        message: format!(
            "All {} campaign caches cleared and will reload on next request",
            count
        ),
        campaign: None,
        evicted: count,
        reloaded_at: unix_millis(SystemTime::now()),
    })
}

pub async fn cache_info(State(state): State<AppState>) -> Json<CacheInfo> {
    let campaigns = state.cache.snapshot();

    Json(CacheInfo {
        cached_campaigns: campaigns.len(),
        campaigns,
        stats: state.cache.stats(),
        timestamp: unix_millis(SystemTime::now()),
    })
}
