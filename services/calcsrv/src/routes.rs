//! Router assembly

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

use crate::api::handlers;
use crate::app_state::AppState;

/// Create all API routes with state
pub fn create_routes(state: AppState) -> Router {
    let body_limit = state.config.api.body_limit;

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/register", post(handlers::register))
        .route("/api/v1/login", post(handlers::login))
        .route("/api/v1/calculate", post(handlers::calculate))
        .route("/api/v1/calculations", get(handlers::list_calculations));

    if state.config.api.enable_admin {
        warn!("Admin endpoints enabled at /api/v1/admin (unauthenticated)");
        router = router.route(
            "/api/v1/admin/log-level",
            get(handlers::admin::get_log_level).put(handlers::admin::set_log_level),
        );
    }

    router
        // Apply HTTP request logging middleware
        .layer(axum::middleware::from_fn(common::logging::http_request_logger))
        // Outermost, so the logger never buffers an oversized body
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
