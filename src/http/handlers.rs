//! Classification and health endpoints.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::{Instant, SystemTime};

use crate::campaign::cache::unix_millis;
use crate::campaign::CampaignError;
use crate::http::server::AppState;
use crate::matching::category::is_stage_id;
use crate::matching::Classification;
use crate::observability::metrics;

/// Classification request, accepted as JSON body or query string.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchRequest {
    pub campaign: String,
    pub speech_text: String,
    pub stage: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MatchResponse {
    pub result: String,
    pub stage: String,
    pub campaign: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: u64,
    pub auto_reload: &'static str,
    pub cached_campaigns: usize,
}

/// JSON error body: `{"error": "..."}`.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

pub async fn match_json(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => handle_match(state, request).await,
        Err(_) => error_response(StatusCode::BAD_REQUEST, "Invalid request"),
    }
}

pub async fn match_query(
    State(state): State<AppState>,
    query: Result<Query<MatchRequest>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(request)) => handle_match(state, request).await,
        Err(_) => error_response(StatusCode::BAD_REQUEST, "Invalid request"),
    }
}

async fn handle_match(state: AppState, request: MatchRequest) -> Response {
    let start = Instant::now();

    if request.campaign.is_empty() || request.speech_text.is_empty() || request.stage.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "campaign, speech_text, and stage are required",
        );
    }

    if !is_stage_id(&request.stage) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid stage format. Must be s1, s2, s3, etc.",
        );
    }

    // Loads read the keyword file under the cache lock; keep that off the reactor
    let cache = state.cache.clone();
    let MatchRequest {
        campaign,
        speech_text,
        stage,
    } = request;
    let lookup = {
        let campaign = campaign.clone();
        let stage = stage.clone();
        tokio::task::spawn_blocking(move || {
            let matcher = cache.get_matcher(&campaign)?;
            let classification = matcher.classify(&speech_text, &stage);
            let outcome = match classification {
                Classification::Matched { .. } => "matched",
                Classification::Fallback { .. } => "fallback",
                Classification::Unknown => "unknown",
            };
            Ok::<_, CampaignError>((classification.label().to_string(), outcome))
        })
        .await
    };

    match lookup {
        Ok(Ok((result, outcome))) => {
            metrics::record_classification(outcome, start);
            tracing::debug!(
                campaign = %campaign,
                stage = %stage,
                result = %result,
                outcome,
                "Classified utterance"
            );
            Json(MatchResponse {
                result,
                stage,
                campaign,
            })
            .into_response()
        }
        Ok(Err(CampaignError::InvalidName(name))) => error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid campaign name: {}", name),
        ),
        Ok(Err(e)) => {
            metrics::record_classification("not_found", start);
            tracing::warn!(campaign = %campaign, error = %e, "Campaign lookup failed");
            error_response(
                StatusCode::NOT_FOUND,
                format!("Campaign not found: {}", campaign),
            )
        }
        Err(e) => {
            tracing::error!(campaign = %campaign, error = %e, "Classification task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Classification failed")
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: unix_millis(SystemTime::now()),
        auto_reload: "enabled",
        cached_campaigns: state.cache.len(),
    })
}
