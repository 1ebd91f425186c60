//! Request and response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_calc::ErrorKind;
use tally_ledger::{CalculationRecord, RecordId, Submission};

use crate::error::{CalcsrvError, Result};

/// Longest accepted login, in characters
pub const MAX_LOGIN_LEN: usize = 64;

pub const REGISTERED_MESSAGE: &str = "User registered successfully";

/// Body of `/register` and `/login`
///
/// Missing fields deserialize as empty and fail [`validate`](Self::validate)
/// with a 400 rather than a JSON extractor rejection. The login is trimmed;
/// the password is taken verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsRequest {
    #[serde(deserialize_with = "common::serde_helpers::deserialize_trimmed")]
    pub login: String,
    pub password: String,
}

impl CredentialsRequest {
    pub fn validate(&self) -> Result<()> {
        if self.login.is_empty() || self.password.is_empty() {
            return Err(CalcsrvError::invalid_request("login and password required"));
        }
        if self.login.chars().count() > MAX_LOGIN_LEN {
            return Err(CalcsrvError::invalid_request(format!(
                "login must be at most {} characters",
                MAX_LOGIN_LEN
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    pub expression: String,
}

impl CalculateRequest {
    /// Parse a raw request body; any JSON or shape error is a 400
    pub fn from_body(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| CalcsrvError::invalid_request(format!("Invalid JSON body: {}", e)))
    }
}

/// Why an expression produced no value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// Result of `POST /api/v1/calculate`
///
/// `result` and `record_id` are both null when evaluation failed; `error`
/// is present only then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub expression: String,
    pub result: Option<String>,
    pub record_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CalculationFailure>,
}

impl From<Submission> for CalculateResponse {
    fn from(submission: Submission) -> Self {
        let record = submission.record.record();
        Self {
            result: record
                .map(|r| r.result.clone())
                .or_else(|| submission.outcome.rendered()),
            record_id: record.map(|r| r.id),
            error: submission.outcome.failure().map(|e| CalculationFailure {
                kind: e.kind(),
                message: e.to_string(),
            }),
            expression: submission.expression,
        }
    }
}

/// One history entry; the owner is implied by the token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationEntry {
    pub id: RecordId,
    pub expression: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

impl From<CalculationRecord> for CalculationEntry {
    fn from(record: CalculationRecord) -> Self {
        Self {
            id: record.id,
            expression: record.expression,
            result: record.result,
            created_at: record.created_at,
        }
    }
}
