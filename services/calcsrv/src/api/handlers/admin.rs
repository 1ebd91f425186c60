//! Runtime log-level control
//!
//! Mounted only when `api.enable_admin` is set.

use axum::response::Json;
use common::logging;
use common::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLevelResponse {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetLogLevelRequest {
    /// Bare level ("debug") or a full filter ("info,tally_ledger=debug")
    pub level: String,
}

/// @route GET /api/v1/admin/log-level
pub async fn get_log_level() -> Json<LogLevelResponse> {
    Json(LogLevelResponse {
        level: logging::get_log_level(),
    })
}

/// @route PUT /api/v1/admin/log-level
/// @status 200 - filter applied
/// @status 400 - filter does not parse
/// @status 503 - logging was initialized without reload support
pub async fn set_log_level(
    Json(req): Json<SetLogLevelRequest>,
) -> Result<Json<LogLevelResponse>, AppError> {
    if !logging::reload_available() {
        return Err(AppError::service_unavailable(
            "Log level cannot be changed in this process",
        ));
    }
    logging::set_log_level(req.level.trim()).map_err(AppError::bad_request)?;

    Ok(Json(LogLevelResponse {
        level: logging::get_log_level(),
    }))
}
