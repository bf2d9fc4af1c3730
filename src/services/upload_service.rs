use uuid::Uuid;

use crate::assets::{release_best_effort, AssetStore, ImageUpload};
use crate::database::CatalogStore;
use crate::services::error::ServiceResult;

/// Stores standalone images and remembers who uploaded them, so that only
/// the uploader can later attach the reference to a record.
pub struct UploadService<'a> {
    store: &'a dyn CatalogStore,
    assets: &'a dyn AssetStore,
}

impl<'a> UploadService<'a> {
    pub fn new(store: &'a dyn CatalogStore, assets: &'a dyn AssetStore) -> Self {
        Self { store, assets }
    }

    pub async fn upload(&self, owner: Uuid, upload: ImageUpload) -> ServiceResult<String> {
        let reference = self.assets.store(upload).await?;
        if let Err(e) = self.store.insert_upload(owner, &reference).await {
            release_best_effort(self.assets, &reference).await;
            return Err(e.into());
        }
        Ok(reference)
    }
}
