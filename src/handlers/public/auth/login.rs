// handlers/public/auth/login.rs - POST /login handler

use axum::{extract::State, extract::rejection::JsonRejection, Json};
use serde::Serialize;

use super::CredentialsRequest;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/**
 * POST /login - Authenticate user and receive JWT token
 *
 * Input: `{"email": "a@x.com", "password": "p"}`
 * Output: `{"token": "eyJhbGciOiJIUzI1NiI..."}`, valid for one hour
 *
 * Unknown email → 404, wrong password → 400 "Credenciales incorrectas"
 */
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(body) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;

    let token = state
        .auth()
        .login(body.email.as_deref(), body.password.as_deref())
        .await?;

    Ok(ApiResponse::success(TokenResponse { token }))
}
