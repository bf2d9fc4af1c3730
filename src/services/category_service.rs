use futures::future::join_all;
use uuid::Uuid;

use crate::assets::AssetStore;
use crate::database::models::Category;
use crate::database::CatalogStore;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::images::release;
use crate::services::input::non_empty;

const NOT_FOUND: &str = "Categoría no encontrada";

pub struct CategoryService<'a> {
    store: &'a dyn CatalogStore,
    assets: &'a dyn AssetStore,
}

impl<'a> CategoryService<'a> {
    pub fn new(store: &'a dyn CatalogStore, assets: &'a dyn AssetStore) -> Self {
        Self { store, assets }
    }

    pub async fn create(&self, owner: Uuid, name: Option<&str>) -> ServiceResult<Category> {
        let name = non_empty(name).ok_or_else(|| ServiceError::validation("El nombre es obligatorio"))?;
        Ok(self.store.insert_category(owner, &name).await?)
    }

    pub async fn list_owned(&self, owner: Uuid) -> ServiceResult<Vec<Category>> {
        Ok(self.store.list_categories(owner).await?)
    }

    pub async fn list_public(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.store.list_all_categories().await?)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> ServiceResult<Category> {
        self.store
            .find_category(owner, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))
    }

    /// A blank name is ignored and the stored category is returned as is.
    pub async fn update(&self, owner: Uuid, id: Uuid, name: Option<&str>) -> ServiceResult<Category> {
        let Some(name) = non_empty(name) else {
            return self.get(owner, id).await;
        };

        self.store
            .rename_category(owner, id, &name)
            .await?
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))
    }

    /// Deletes the category and then every product of the same owner filed
    /// under it. The two deletes are separate writes; a crash in between
    /// leaves those products pointing at a missing category.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> ServiceResult<Category> {
        let category = self
            .store
            .delete_category(owner, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))?;

        let removed = self.store.delete_products_in_category(owner, id).await?;
        if !removed.is_empty() {
            tracing::info!(
                "Deleted {} product(s) with category {}",
                removed.len(),
                category.id
            );
        }

        let releases = removed
            .iter()
            .filter_map(|p| p.image.as_deref())
            .map(|reference| release(self.store, self.assets, reference));
        join_all(releases).await;

        Ok(category)
    }
}
