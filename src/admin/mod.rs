pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use crate::http::server::AppState;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// Administrative routes: evict one, evict all, introspect.
pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/reload/{campaign}", post(reload_campaign))
        .route("/admin/reload-all", post(reload_all))
        .route("/admin/cache-info", get(cache_info))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
