use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::path::PathBuf;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Builds the full router. `photos_dir` is served at `/photos` when images
/// are kept on local disk.
pub fn app(state: AppState, photos_dir: Option<PathBuf>) -> Router {
    let max_body = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security.cors_origins);

    let mut router = Router::new()
        // Public
        .merge(public_routes())
        // Protected (bearer JWT)
        .merge(protected_routes(state.clone()));

    if let Some(dir) = photos_dir {
        router = router.nest_service("/photos", ServeDir::new(dir));
    }

    // Global middleware, outermost first
    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(DefaultBodyLimit::max(max_body)),
    )
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/register", post(public::register_post))
        .route("/login", post(public::login_post))
        .route("/public/categories", get(public::categories_get))
        .route("/public/products", get(public::products_get))
        .route("/movies/public", get(public::movies_get))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(protected::categories_get).post(protected::categories_post),
        )
        .route(
            "/categories/:id",
            get(protected::category_get)
                .put(protected::category_put)
                .delete(protected::category_delete),
        )
        .route(
            "/products",
            get(protected::products_get).post(protected::products_post),
        )
        .route(
            "/products/:id",
            get(protected::product_get)
                .put(protected::product_put)
                .delete(protected::product_delete),
        )
        .route(
            "/products/:id/toggle-active",
            put(protected::product_toggle_active),
        )
        .route(
            "/movies",
            get(protected::movies_get).post(protected::movies_post),
        )
        .route(
            "/movies/:id",
            get(protected::movie_get)
                .put(protected::movie_put)
                .delete(protected::movie_delete),
        )
        .route("/upload", post(protected::upload_post))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

/// Empty origin list or `*` allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}
