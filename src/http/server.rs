//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener and drain on shutdown

use axum::{
    body::Body,
    http::Request,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::campaign::CampaignCache;
use crate::config::ServiceConfig;
use crate::http::handlers::{health, match_json, match_query};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CampaignCache>,
    /// Bearer token for `/admin/*`; `None` leaves them open.
    pub admin_api_key: Option<Arc<str>>,
}

/// HTTP server for the keyword matcher.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over an existing cache.
    pub fn new(config: &ServiceConfig, cache: Arc<CampaignCache>) -> Self {
        let state = AppState {
            cache,
            admin_api_key: config.admin.api_key.as_deref().map(Arc::from),
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/match", get(match_query).post(match_json))
            .route("/health", get(health))
            .merge(setup_admin_router(state.clone()))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %req.request_id_str(),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::http::request::X_REQUEST_ID;

    fn server_with(campaign: &str, body: &str) -> (tempfile::TempDir, HttpServer) {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(format!("{}.json", campaign)), body).unwrap();
        let cache = Arc::new(CampaignCache::new(dir.path(), Default::default()));
        let server = HttpServer::new(&ServiceConfig::default(), cache);
        (dir, server)
    }

    #[tokio::test]
    async fn test_match_route_in_process() {
        let (_dir, server) = server_with("acme", r#"{"busy_p1_s1": ["busy"]}"#);

        let request = Request::builder()
            .uri("/match?campaign=acme&stage=s1&speech_text=sorry%20I%27m%20busy")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(&X_REQUEST_ID));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["result"], "BUSY");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (_dir, server) = server_with("acme", "{}");

        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
