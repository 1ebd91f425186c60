//! Unified error handling for Tally services
//!
//! Each crate keeps its own domain error enum; this crate supplies the
//! shared classification ([`ErrorCategory`]), the capability trait every
//! service error implements ([`ServiceErrorTrait`]), and [`ServiceError`],
//! the boundary error used by binaries during startup and shutdown.

use thiserror::Error;

// ============================================================================
// ServiceError - boundary error type
// ============================================================================

/// Error type for service bootstrap and other cross-cutting failures
#[derive(Debug, Error)]
pub enum ServiceError {
    // ======================================
    // Configuration Errors
    // ======================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // ======================================
    // Runtime Errors
    // ======================================
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service startup failed: {0}")]
    StartupFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceErrorTrait for ServiceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Sqlite(_) => "SQLITE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::StartupFailed(_) => "STARTUP_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Other(_) => "OTHER_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Sqlite(_) => ErrorCategory::Database,
            Self::Io(_) | Self::StartupFailed(_) | Self::Internal(_) => ErrorCategory::Internal,
            Self::Other(_) => ErrorCategory::Unknown,
        }
    }
}

// ============================================================================
// Error capability trait
// ============================================================================

/// Error category - used for classification and HTTP mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    // Infrastructure layer
    Configuration,
    Database,
    Timeout,

    // Request layer
    Validation,
    Authentication,
    Conflict,

    // System level
    Internal,
    Unknown,
}

/// Capability trait shared by every service error type
///
/// Services keep their own domain-specific error enums and gain a common
/// outward-facing interface by implementing this trait.
pub trait ServiceErrorTrait: std::error::Error + Send + Sync + 'static {
    /// Stable error code (for API bodies and logs)
    fn error_code(&self) -> &'static str;

    /// Error category (for classification)
    fn category(&self) -> ErrorCategory;

    /// Whether the caller may retry the same request
    fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Timeout)
    }

    /// Convert to HTTP status code
    #[cfg(feature = "axum-support")]
    fn http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Authentication => StatusCode::UNAUTHORIZED,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Level at which the error should be logged
    fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self.category() {
            ErrorCategory::Internal | ErrorCategory::Database | ErrorCategory::Unknown => {
                Level::ERROR
            },
            ErrorCategory::Timeout | ErrorCategory::Configuration => Level::WARN,
            _ => Level::INFO,
        }
    }
}

// Tests
#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_categories() {
        let err = ServiceError::Validation("api.port must be greater than 0".into());
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(
            err.to_string(),
            "Validation failed: api.port must be greater than 0"
        );

        let err: ServiceError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.error_code(), "SQLITE_ERROR");
        assert_eq!(err.category(), ErrorCategory::Database);

        let err: ServiceError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.category(), ErrorCategory::Unknown);
    }

    #[test]
    fn test_error_retryable() {
        assert!(!ServiceError::Configuration("bad".into()).is_retryable());
        assert!(!ServiceError::Sqlite(sqlx::Error::PoolTimedOut).is_retryable());
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(
            ServiceError::Internal("boom".into()).log_level(),
            tracing::Level::ERROR
        );
        assert_eq!(
            ServiceError::Configuration("bad".into()).log_level(),
            tracing::Level::WARN
        );
        assert_eq!(
            ServiceError::Validation("bad".into()).log_level(),
            tracing::Level::INFO
        );
    }

    #[cfg(feature = "axum-support")]
    #[test]
    fn test_http_status_mapping() {
        use axum::http::StatusCode;
        assert_eq!(
            ServiceError::Validation("x".into()).http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Sqlite(sqlx::Error::PoolTimedOut).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
