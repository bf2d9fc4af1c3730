// handlers/protected/upload.rs - POST /upload, stores an image on its own

use axum::{extract::State, Extension};
use serde::Serialize;

use crate::error::ApiError;
use crate::handlers::form::ResourceForm;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

/// The returned reference can be sent once, by the same user, as `image`
/// when creating or updating a record.
pub async fn upload_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    form: ResourceForm,
) -> ApiResult<UploadResponse> {
    let upload = form
        .into_upload()
        .ok_or_else(|| ApiError::validation_error("No se proporcionó ninguna imagen"))?;

    let reference = state.uploads().upload(user.id, upload).await?;

    tracing::info!("User {} uploaded image {}", user.id, reference);
    Ok(ApiResponse::created(UploadResponse {
        image_url: reference,
    }))
}
