//! Expression submission and history

use axum::{body::Bytes, extract::State, response::Json};
use common::AppError;

use crate::api::dto::{CalculateRequest, CalculateResponse, CalculationEntry};
use crate::app_state::AppState;
use crate::auth::MaybePrincipal;
use crate::error::CalcsrvError;

/// Evaluate an expression and record it for the caller
///
/// @route POST /api/v1/calculate
/// @input `{expression}` plus `Authorization: Bearer <token>`
/// @status 200 - value computed and recorded, or evaluation failed (`error` set, nothing recorded)
/// @status 400 - body is not `{"expression": "<text>"}`
/// @status 401 - no valid token, checked before the body is read
/// @status 500 - the record could not be written
pub async fn calculate(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
    body: Bytes,
) -> Result<Json<CalculateResponse>, AppError> {
    let principal = principal.ok_or(CalcsrvError::Unauthenticated)?;
    let req = CalculateRequest::from_body(&body)?;

    let submission = state
        .calculations
        .submit(Some(principal), &req.expression)
        .await
        .map_err(CalcsrvError::from)?;

    Ok(Json(submission.into()))
}

/// The caller's calculations, oldest first
///
/// @route GET /api/v1/calculations
/// @status 200 - array of `{id, expression, result, created_at}`
/// @status 401 - no valid token
pub async fn list_calculations(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
) -> Result<Json<Vec<CalculationEntry>>, AppError> {
    let records = state
        .calculations
        .history(principal)
        .await
        .map_err(CalcsrvError::from)?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}
