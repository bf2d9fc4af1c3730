// handlers/protected/products.rs - Owner-scoped product CRUD and activation toggle

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Serialize;

use crate::database::models::Product;
use crate::handlers::form::{parse_id, ResourceForm};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MessageResponse};
use crate::state::AppState;

const NOT_FOUND: &str = "Producto no encontrado";

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub message: String,
    pub activo: bool,
}

/// POST /products - JSON or multipart with an optional "image" file
pub async fn products_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    form: ResourceForm,
) -> ApiResult<Product> {
    let product = state.products().create(user.id, form.into_product()).await?;
    Ok(ApiResponse::created(product))
}

/// GET /products
pub async fn products_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Product>> {
    Ok(ApiResponse::success(state.products().list_owned(user.id).await?))
}

/// GET /products/:id
pub async fn product_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(ApiResponse::success(state.products().get(user.id, id).await?))
}

/// PUT /products/:id - omitted or empty fields keep their stored value
pub async fn product_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    form: ResourceForm,
) -> ApiResult<Product> {
    let id = parse_id(&id, NOT_FOUND)?;
    let product = state
        .products()
        .update(user.id, id, form.into_product())
        .await?;
    Ok(ApiResponse::success(product))
}

/// PUT /products/:id/toggle-active
pub async fn product_toggle_active(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<ToggleResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let product = state.products().toggle_active(user.id, id).await?;

    let message = if product.active {
        "Producto activado"
    } else {
        "Producto desactivado"
    };
    Ok(ApiResponse::success(ToggleResponse {
        message: message.to_string(),
        activo: product.active,
    }))
}

/// DELETE /products/:id
pub async fn product_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.products().delete(user.id, id).await?;
    Ok(ApiResponse::success(MessageResponse::new("Producto eliminado")))
}
