//! Error handling for the calculation service

use errors::{ErrorCategory, ServiceError, ServiceErrorTrait};
use tally_ledger::{LedgerError, SubmissionError};
use thiserror::Error;

/// Calculation service error type
#[derive(Error, Debug)]
pub enum CalcsrvError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No valid bearer token on a request that needs one
    #[error("Authentication required")]
    Unauthenticated,

    /// Unknown login or wrong password; the two are indistinguishable on purpose
    #[error("Invalid login or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("User '{0}' already exists")]
    UserExists(String),

    #[error("Stored password hash is malformed")]
    MalformedHash,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CalcsrvError>;

impl CalcsrvError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<SubmissionError> for CalcsrvError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Unauthenticated => Self::Unauthenticated,
            SubmissionError::Storage(e) => Self::Ledger(e),
        }
    }
}

impl From<CalcsrvError> for ServiceError {
    fn from(err: CalcsrvError) -> Self {
        match err {
            CalcsrvError::Config(msg) => ServiceError::Configuration(msg),
            CalcsrvError::Database(e) => ServiceError::Sqlite(e),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

// ============================================================================
// CalcsrvError implements ServiceErrorTrait
// ============================================================================

impl ServiceErrorTrait for CalcsrvError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CALCSRV_CONFIG_ERROR",
            Self::InvalidRequest(_) => "CALCSRV_INVALID_REQUEST",
            Self::Unauthenticated => "CALCSRV_UNAUTHENTICATED",
            Self::InvalidCredentials => "CALCSRV_INVALID_CREDENTIALS",
            Self::InvalidToken(_) => "CALCSRV_INVALID_TOKEN",
            Self::UserExists(_) => "CALCSRV_USER_EXISTS",
            Self::MalformedHash => "CALCSRV_MALFORMED_HASH",
            Self::Ledger(LedgerError::Timeout { .. }) => "CALCSRV_STORAGE_TIMEOUT",
            Self::Ledger(_) => "CALCSRV_STORAGE_ERROR",
            Self::Database(_) => "CALCSRV_DATABASE_ERROR",
            Self::Internal(_) => "CALCSRV_INTERNAL_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::InvalidRequest(_) => ErrorCategory::Validation,
            Self::Unauthenticated | Self::InvalidCredentials | Self::InvalidToken(_) => {
                ErrorCategory::Authentication
            },
            Self::UserExists(_) => ErrorCategory::Conflict,
            Self::Ledger(LedgerError::Timeout { .. }) => ErrorCategory::Timeout,
            Self::Ledger(_) | Self::Database(_) => ErrorCategory::Database,
            Self::MalformedHash | Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

// ============================================================================
// API Adaptation: CalcsrvError → AppError conversion
// ============================================================================

impl From<CalcsrvError> for common::AppError {
    fn from(err: CalcsrvError) -> Self {
        let app_error = common::AppError::from_service_error(&err);
        match err.category() {
            // Storage causes stay in the log, not the response body
            ErrorCategory::Database | ErrorCategory::Timeout | ErrorCategory::Internal => {
                tracing::error!("{}: {}", err.error_code(), err);
                common::AppError::new(
                    app_error.status,
                    common::ErrorInfo::new("Internal server error")
                        .with_code(app_error.status.as_u16())
                        .with_error_code(err.error_code()),
                )
            },
            _ => app_error,
        }
    }
}
