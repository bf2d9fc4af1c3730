// handlers/public/catalog.rs - Unauthenticated browsing of every owner's records

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::database::models::{Category, Movie, PublicProduct};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category_id: Option<String>,
}

/// GET /public/categories
pub async fn categories_get(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(state.categories().list_public().await?))
}

/// GET /public/products?categoryId= - active products with their category name
pub async fn products_get(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> ApiResult<Vec<PublicProduct>> {
    let products = state
        .products()
        .list_public(filter.category_id.as_deref())
        .await?;
    Ok(ApiResponse::success(products))
}

/// GET /movies/public
pub async fn movies_get(State(state): State<AppState>) -> ApiResult<Vec<Movie>> {
    Ok(ApiResponse::success(state.movies().list_public().await?))
}
