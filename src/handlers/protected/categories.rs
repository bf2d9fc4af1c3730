// handlers/protected/categories.rs - Owner-scoped category CRUD

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::database::models::Category;
use crate::handlers::form::{parse_id, ResourceForm};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MessageResponse};
use crate::state::AppState;

const NOT_FOUND: &str = "Categoría no encontrada";

/// POST /categories
pub async fn categories_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    form: ResourceForm,
) -> ApiResult<Category> {
    let category = state.categories().create(user.id, form.text("name")).await?;
    Ok(ApiResponse::created(category))
}

/// GET /categories
pub async fn categories_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(state.categories().list_owned(user.id).await?))
}

/// GET /categories/:id
pub async fn category_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Category> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(ApiResponse::success(state.categories().get(user.id, id).await?))
}

/// PUT /categories/:id
pub async fn category_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    form: ResourceForm,
) -> ApiResult<Category> {
    let id = parse_id(&id, NOT_FOUND)?;
    let category = state
        .categories()
        .update(user.id, id, form.text("name"))
        .await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /categories/:id - also deletes the caller's products in it
pub async fn category_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.categories().delete(user.id, id).await?;
    Ok(ApiResponse::success(MessageResponse::new(
        "Categoría y productos asociados eliminados",
    )))
}
