// handlers/protected/movies.rs - Owner-scoped movie listing CRUD

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::database::models::Movie;
use crate::handlers::form::{parse_id, ResourceForm};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MessageResponse};
use crate::state::AppState;

const NOT_FOUND: &str = "Película no encontrada";

/// POST /movies
pub async fn movies_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    form: ResourceForm,
) -> ApiResult<Movie> {
    let movie = state.movies().create(user.id, form.into_movie()).await?;
    Ok(ApiResponse::created(movie))
}

/// GET /movies
pub async fn movies_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Movie>> {
    Ok(ApiResponse::success(state.movies().list_owned(user.id).await?))
}

/// GET /movies/:id
pub async fn movie_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Movie> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(ApiResponse::success(state.movies().get(user.id, id).await?))
}

/// PUT /movies/:id
pub async fn movie_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    form: ResourceForm,
) -> ApiResult<Movie> {
    let id = parse_id(&id, NOT_FOUND)?;
    let movie = state.movies().update(user.id, id, form.into_movie()).await?;
    Ok(ApiResponse::success(movie))
}

/// DELETE /movies/:id
pub async fn movie_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.movies().delete(user.id, id).await?;
    Ok(ApiResponse::success(MessageResponse::new("Película eliminada")))
}
