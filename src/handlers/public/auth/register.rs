// handlers/public/auth/register.rs - POST /register handler

use axum::{extract::State, extract::rejection::JsonRejection, Json};

use super::CredentialsRequest;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, MessageResponse};
use crate::state::AppState;

/**
 * POST /register - Register new user account
 *
 * Input: `{"email": "a@x.com", "password": "p"}`
 * Output: 201 `{"message": "Usuario registrado"}`; nothing about the user is echoed
 *
 * Duplicate email → 409
 */
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(body) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;

    state
        .auth()
        .register(body.email.as_deref(), body.password.as_deref())
        .await?;

    Ok(ApiResponse::created(MessageResponse::new("Usuario registrado")))
}
