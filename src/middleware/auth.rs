use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::ServiceError;
use crate::state::AppState;

/// Authenticated caller, injected into request extensions by the gate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // A missing or malformed header is rejected without attempting verification
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let id = state.tokens.verify(token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::from(ServiceError::from(e))
    })?;

    request.extensions_mut().insert(AuthUser { id });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Token no proporcionado")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Formato de token no válido")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Token no proporcionado"),
        None => Err("Formato de token no válido"),
    }
}
