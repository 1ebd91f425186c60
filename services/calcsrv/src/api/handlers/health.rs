//! Health check

use std::collections::HashMap;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use common::{ComponentHealth, HealthStatus, ServiceStatus, SuccessResponse};
use tracing::warn;

use crate::app_state::AppState;
use crate::config::SERVICE_NAME;

/// Health check endpoint
///
/// @route GET /health
/// @status 200 - service and database reachable
/// @status 503 - database check failed
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<SuccessResponse<HealthStatus>>) {
    let started = Instant::now();
    let database = match state.db.ping().await {
        Ok(()) => ComponentHealth {
            status: ServiceStatus::Healthy,
            message: None,
            duration_ms: Some(started.elapsed().as_millis() as u64),
        },
        Err(e) => {
            warn!("Database health check failed: {}", e);
            ComponentHealth {
                status: ServiceStatus::Unhealthy,
                message: Some(e.to_string()),
                duration_ms: Some(started.elapsed().as_millis() as u64),
            }
        },
    };

    let mut checks = HashMap::new();
    checks.insert("database".to_string(), database);
    let status = HealthStatus::aggregate(&checks);

    let code = match status {
        ServiceStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    let health = HealthStatus {
        status,
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        timestamp: Utc::now(),
        checks,
    };

    (code, Json(SuccessResponse::new(health)))
}
