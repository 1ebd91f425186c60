//! Shared API models for Tally services
//!
//! Success bodies are `{"success": true, "data": ...}`; failures are
//! `{"success": false, "error": {"code", "error_code"?, "message"}}`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Standard API Response Models
// ============================================================================

/// Standard success response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    /// Success indicator (always true)
    #[serde(default = "crate::serde_helpers::bool_true")]
    pub success: bool,
    /// Response data
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Success indicator (always false for errors)
    #[serde(default = "crate::serde_helpers::bool_false")]
    pub success: bool,
    pub error: ErrorInfo,
}

/// Standard error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// HTTP status code
    pub code: u16,
    /// Stable machine-readable code, e.g. `UNAUTHENTICATED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 500,
            error_code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    pub fn with_error_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }
}

// ============================================================================
// AppError - HTTP Error with proper status codes (requires axum feature)
// ============================================================================

#[cfg(feature = "axum")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

/// Application error with HTTP status code
///
/// Implements `IntoResponse` so handlers can return `Result<_, AppError>`.
#[cfg(feature = "axum")]
#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub error: ErrorInfo,
}

#[cfg(feature = "axum")]
impl AppError {
    pub fn new(status: StatusCode, error: ErrorInfo) -> Self {
        Self { status, error }
    }

    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ErrorInfo::new(message).with_code(status.as_u16()),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }

    /// 503 Service Unavailable
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Map any service error through its category and code
    pub fn from_service_error<E: errors::ServiceErrorTrait>(err: &E) -> Self {
        let status = err.http_status();
        Self {
            status,
            error: ErrorInfo::new(err.to_string())
                .with_code(status.as_u16())
                .with_error_code(err.error_code()),
        }
    }
}

#[cfg(feature = "axum")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                error: self.error,
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Service Health Models
// ============================================================================

/// Service health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: ServiceStatus,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Individual component checks
    #[serde(default)]
    pub checks: HashMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Component health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Check duration in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl HealthStatus {
    /// Worst status among the component checks
    pub fn aggregate(checks: &HashMap<String, ComponentHealth>) -> ServiceStatus {
        checks
            .values()
            .map(|c| c.status)
            .fold(ServiceStatus::Healthy, |acc, s| match (acc, s) {
                (ServiceStatus::Unhealthy, _) | (_, ServiceStatus::Unhealthy) => {
                    ServiceStatus::Unhealthy
                },
                (ServiceStatus::Degraded, _) | (_, ServiceStatus::Degraded) => {
                    ServiceStatus::Degraded
                },
                _ => ServiceStatus::Healthy,
            })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_success_response_shape() {
        let json = serde_json::to_value(SuccessResponse::new(42)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 42}));
    }

    #[test]
    fn test_error_info_skips_empty_fields() {
        let json = serde_json::to_value(ErrorInfo::new("boom").with_code(500)).unwrap();
        assert_eq!(json, serde_json::json!({"code": 500, "message": "boom"}));
    }

    #[test]
    fn test_health_aggregate() {
        let mut checks = HashMap::new();
        assert_eq!(HealthStatus::aggregate(&checks), ServiceStatus::Healthy);

        checks.insert(
            "database".to_string(),
            ComponentHealth {
                status: ServiceStatus::Unhealthy,
                message: Some("down".into()),
                duration_ms: None,
            },
        );
        assert_eq!(HealthStatus::aggregate(&checks), ServiceStatus::Unhealthy);
    }

    #[cfg(feature = "axum")]
    #[test]
    fn test_app_error_from_service_error() {
        let err = errors::ServiceError::Validation("api.port must be greater than 0".into());
        let app = AppError::from_service_error(&err);
        assert_eq!(app.status, StatusCode::BAD_REQUEST);
        assert_eq!(app.error.code, 400);
        assert_eq!(app.error.error_code.as_deref(), Some("VALIDATION_ERROR"));
    }

    #[cfg(feature = "axum")]
    #[tokio::test]
    async fn test_app_error_into_response() {
        use http_body_util::BodyExt;

        let response = AppError::service_unavailable("Reload unsupported").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], 503);
        assert_eq!(json["error"]["message"], "Reload unsupported");
    }
}
