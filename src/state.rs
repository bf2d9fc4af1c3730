use std::sync::Arc;

use crate::assets::AssetStore;
use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::CatalogStore;
use crate::services::{AuthService, CategoryService, MovieService, ProductService, UploadService};

/// Shared, read-only application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn CatalogStore>,
    pub assets: Arc<dyn AssetStore>,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn CatalogStore>, assets: Arc<dyn AssetStore>) -> Self {
        let tokens = TokenIssuer::new(&config.security.jwt_secret);
        Self {
            config: Arc::new(config),
            store,
            assets,
            tokens,
        }
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store.as_ref(), &self.tokens, self.config.security.bcrypt_cost)
    }

    pub fn categories(&self) -> CategoryService<'_> {
        CategoryService::new(self.store.as_ref(), self.assets.as_ref())
    }

    pub fn products(&self) -> ProductService<'_> {
        ProductService::new(self.store.as_ref(), self.assets.as_ref())
    }

    pub fn movies(&self) -> MovieService<'_> {
        MovieService::new(self.store.as_ref(), self.assets.as_ref())
    }

    pub fn uploads(&self) -> UploadService<'_> {
        UploadService::new(self.store.as_ref(), self.assets.as_ref())
    }
}
