//! Registration and login

use axum::{extract::State, response::Json};
use common::AppError;
use tracing::info;

use crate::api::dto::{CredentialsRequest, MessageResponse, TokenResponse, REGISTERED_MESSAGE};
use crate::app_state::AppState;

/// Create an account
///
/// @route POST /api/v1/register
/// @input `{login, password}`
/// @status 200 - `{"message": "User registered successfully"}`
/// @status 400 - missing field or login longer than 64 characters
/// @status 409 - login already taken
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    req.validate()?;
    state.credentials.register(&req.login, &req.password).await?;

    Ok(Json(MessageResponse {
        message: REGISTERED_MESSAGE.to_string(),
    }))
}

/// Exchange credentials for a bearer token
///
/// @route POST /api/v1/login
/// @input `{login, password}`
/// @status 200 - `{"token": "<jwt>"}`
/// @status 401 - unknown login or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()?;
    let user = state
        .credentials
        .authenticate(&req.login, &req.password)
        .await?;
    let token = state.jwt.issue(user.id, &user.login)?;

    info!(user_id = user.id, "Token issued for {}", user.login);
    Ok(Json(TokenResponse { token }))
}
