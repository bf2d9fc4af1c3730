use uuid::Uuid;

use crate::assets::AssetStore;
use crate::database::models::{NewProduct, Product, PublicProduct};
use crate::database::CatalogStore;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::images::{release, release_replaced, settle, StagedImage};
use crate::services::input::{non_empty, ProductInput};

const NOT_FOUND: &str = "Producto no encontrado";

pub struct ProductService<'a> {
    store: &'a dyn CatalogStore,
    assets: &'a dyn AssetStore,
}

impl<'a> ProductService<'a> {
    pub fn new(store: &'a dyn CatalogStore, assets: &'a dyn AssetStore) -> Self {
        Self { store, assets }
    }

    /// Products may only be filed under the caller's own categories.
    async fn ensure_category(&self, owner: Uuid, category_id: Option<Uuid>) -> ServiceResult<()> {
        if let Some(category_id) = category_id {
            if self.store.find_category(owner, category_id).await?.is_none() {
                return Err(ServiceError::validation("Categoría no encontrada"));
            }
        }
        Ok(())
    }

    pub async fn create(&self, owner: Uuid, mut input: ProductInput) -> ServiceResult<Product> {
        let draft = input.draft()?;
        self.ensure_category(owner, draft.category_id).await?;

        let staged =
            StagedImage::stage(self.store, self.assets, owner, input.image.take(), None).await?;
        let new = NewProduct {
            name: draft.name,
            description: draft.description,
            price: draft.price,
            image: staged.as_ref().map(|s| s.reference.clone()),
            category_id: draft.category_id,
        };

        let result = self.store.insert_product(owner, new).await.map_err(ServiceError::from);
        settle(self.store, self.assets, staged, result).await
    }

    pub async fn list_owned(&self, owner: Uuid) -> ServiceResult<Vec<Product>> {
        Ok(self.store.list_products(owner).await?)
    }

    /// Active products of every owner. A blank filter lists all categories.
    pub async fn list_public(&self, category_id: Option<&str>) -> ServiceResult<Vec<PublicProduct>> {
        let filter = match non_empty(category_id) {
            Some(raw) => Some(
                Uuid::parse_str(&raw).map_err(|_| ServiceError::validation("Categoría no válida"))?,
            ),
            None => None,
        };
        Ok(self.store.list_public_products(filter).await?)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> ServiceResult<Product> {
        self.store
            .find_product(owner, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))
    }

    /// Stores the new image, writes the record, then releases the image it
    /// replaced. A failed write releases the new image instead.
    pub async fn update(&self, owner: Uuid, id: Uuid, mut input: ProductInput) -> ServiceResult<Product> {
        let mut changes = input.changes()?;
        let existing = self.get(owner, id).await?;
        if let Some(category_id) = changes.category_id {
            self.ensure_category(owner, category_id).await?;
        }

        let staged = StagedImage::stage(
            self.store,
            self.assets,
            owner,
            input.image.take(),
            existing.image.as_deref(),
        )
        .await?;
        if let Some(staged) = &staged {
            changes.image = Some(Some(staged.reference.clone()));
        }

        let result = match self.store.update_product(owner, id, &changes).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) => Err(ServiceError::not_found(NOT_FOUND)),
            Err(e) => Err(e.into()),
        };
        let updated = settle(self.store, self.assets, staged, result).await?;

        release_replaced(
            self.store,
            self.assets,
            existing.image.as_deref(),
            updated.image.as_deref(),
        )
        .await;
        Ok(updated)
    }

    pub async fn toggle_active(&self, owner: Uuid, id: Uuid) -> ServiceResult<Product> {
        let product = self
            .store
            .toggle_product(owner, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))?;

        tracing::debug!("Product {} active={}", product.id, product.active);
        Ok(product)
    }

    /// The record delete stands even if releasing its image fails.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> ServiceResult<Product> {
        let product = self
            .store
            .delete_product(owner, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))?;

        if let Some(reference) = product.image.as_deref() {
            release(self.store, self.assets, reference).await;
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageUpload;
    use crate::database::{MemoryCatalog, UploadStore};
    use crate::services::input::ImageInput;
    use crate::services::CategoryService;
    use crate::testing::RecordingAssets;
    use bytes::Bytes;

    fn input(name: &str, price: &str) -> ProductInput {
        ProductInput {
            name: Some(name.to_string()),
            description: Some("desc".to_string()),
            price: Some(price.to_string()),
            ..Default::default()
        }
    }

    fn upload(name: &str) -> Option<ImageInput> {
        Some(ImageInput::Upload(ImageUpload {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: Bytes::from_static(b"png"),
        }))
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_flag() {
        let store = MemoryCatalog::new();
        let assets = RecordingAssets::new();
        let service = ProductService::new(&store, &assets);
        let owner = Uuid::new_v4();

        let tea = service.create(owner, input("Tea", "2")).await.unwrap();
        assert!(tea.active);
        assert!(!service.toggle_active(owner, tea.id).await.unwrap().active);
        assert!(service.toggle_active(owner, tea.id).await.unwrap().active);
    }

    #[tokio::test]
    async fn test_foreign_category_rejected() {
        let store = MemoryCatalog::new();
        let assets = RecordingAssets::new();
        let categories = CategoryService::new(&store, &assets);
        let service = ProductService::new(&store, &assets);
        let owner = Uuid::new_v4();
        let theirs = categories.create(Uuid::new_v4(), Some("Theirs")).await.unwrap();

        let mut tea = input("Tea", "2");
        tea.category_id = Some(theirs.id.to_string());
        tea.image = upload("tea.png");
        assert!(matches!(
            service.create(owner, tea).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(assets.stored().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_and_releases_old_image() {
        let store = MemoryCatalog::new();
        let assets = RecordingAssets::new();
        let service = ProductService::new(&store, &assets);
        let owner = Uuid::new_v4();

        let mut tea = input("Tea", "2");
        tea.image = upload("old.png");
        let tea = service.create(owner, tea).await.unwrap();
        let old = tea.image.clone().unwrap();

        let changes = ProductInput {
            image: upload("new.png"),
            ..Default::default()
        };
        let updated = service.update(owner, tea.id, changes).await.unwrap();
        assert_ne!(updated.image.as_deref(), Some(old.as_str()));
        assert_eq!(updated.name, "Tea");
        assert_eq!(updated.price, 2.0);
        assert_eq!(assets.deleted(), vec![old]);
    }

    #[tokio::test]
    async fn test_update_of_foreign_product_stores_nothing() {
        let store = MemoryCatalog::new();
        let assets = RecordingAssets::new();
        let service = ProductService::new(&store, &assets);

        let tea = service.create(Uuid::new_v4(), input("Tea", "2")).await.unwrap();
        let changes = ProductInput {
            name: Some("Mine".to_string()),
            image: upload("new.png"),
            ..Default::default()
        };
        assert!(matches!(
            service.update(Uuid::new_v4(), tea.id, changes).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(assets.stored().is_empty());
    }

    #[tokio::test]
    async fn test_delete_survives_cleanup_failure() {
        let store = MemoryCatalog::new();
        let assets = RecordingAssets::failing_deletes();
        let service = ProductService::new(&store, &assets);
        let owner = Uuid::new_v4();

        store.insert_upload(owner, "tea.png").await.unwrap();
        let mut tea = input("Tea", "2");
        tea.image = Some(ImageInput::Reference("tea.png".to_string()));
        let tea = service.create(owner, tea).await.unwrap();

        service.delete(owner, tea.id).await.unwrap();
        assert!(matches!(
            service.get(owner, tea.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_public_listing_rejects_malformed_filter() {
        let store = MemoryCatalog::new();
        let assets = RecordingAssets::new();
        let service = ProductService::new(&store, &assets);

        assert!(service.list_public(Some("")).await.unwrap().is_empty());
        assert!(matches!(
            service.list_public(Some("drinks")).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
