use uuid::Uuid;

use crate::assets::{release_best_effort, AssetStore};
use crate::database::CatalogStore;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::input::ImageInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Stored inline with this request
    Stored,
    /// Claimed from the caller's own `/upload` results
    Claimed,
}

/// Image reference resolved ahead of a record write.
#[derive(Debug)]
pub struct StagedImage {
    pub reference: String,
    owner: Uuid,
    origin: Origin,
}

impl StagedImage {
    /// Stores an upload, or claims a reference the caller uploaded through
    /// `/upload`. A reference that is unknown, someone else's, or already
    /// attached to a record is rejected. Re-sending the record's `current`
    /// reference is not a change. Storage failures abort before any record
    /// is written.
    pub async fn stage(
        store: &dyn CatalogStore,
        assets: &dyn AssetStore,
        owner: Uuid,
        input: Option<ImageInput>,
        current: Option<&str>,
    ) -> ServiceResult<Option<Self>> {
        match input {
            None => Ok(None),
            Some(ImageInput::Reference(reference)) => {
                let reference = reference.trim().to_string();
                if reference.is_empty() || current == Some(reference.as_str()) {
                    return Ok(None);
                }
                if !store.claim_upload(owner, &reference).await? {
                    return Err(ServiceError::validation("Referencia de imagen no válida"));
                }
                Ok(Some(Self {
                    reference,
                    owner,
                    origin: Origin::Claimed,
                }))
            }
            Some(ImageInput::Upload(upload)) => {
                let reference = assets.store(upload).await?;
                Ok(Some(Self {
                    reference,
                    owner,
                    origin: Origin::Stored,
                }))
            }
        }
    }

    /// Undoes `stage` after the record write failed: an inline upload is
    /// released, a claimed reference becomes claimable again.
    pub async fn discard(self, store: &dyn CatalogStore, assets: &dyn AssetStore) {
        match self.origin {
            Origin::Stored => {
                tracing::debug!("Discarding unlinked image {}", self.reference);
                release_best_effort(assets, &self.reference).await;
            }
            Origin::Claimed => {
                if let Err(e) = store.unclaim_upload(self.owner, &self.reference).await {
                    tracing::warn!("Could not unclaim upload {}: {}", self.reference, e);
                }
            }
        }
    }
}

/// Discards the staged image when `result` is an error, then passes it on.
pub async fn settle<T>(
    store: &dyn CatalogStore,
    assets: &dyn AssetStore,
    staged: Option<StagedImage>,
    result: ServiceResult<T>,
) -> ServiceResult<T> {
    if result.is_err() {
        if let Some(staged) = staged {
            staged.discard(store, assets).await;
        }
    }
    result
}

/// Deletes an asset a record no longer points at, together with its upload
/// entry. Failures are logged.
pub async fn release(store: &dyn CatalogStore, assets: &dyn AssetStore, reference: &str) {
    release_best_effort(assets, reference).await;
    if let Err(e) = store.delete_upload(reference).await {
        tracing::warn!("Could not forget upload {}: {}", reference, e);
    }
}

/// Releases the image a record pointed at before it was replaced.
pub async fn release_replaced(
    store: &dyn CatalogStore,
    assets: &dyn AssetStore,
    previous: Option<&str>,
    current: Option<&str>,
) {
    if let Some(old) = previous {
        if Some(old) != current {
            release(store, assets, old).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryCatalog, UploadStore};
    use crate::testing::RecordingAssets;

    fn reference(value: &str) -> Option<ImageInput> {
        Some(ImageInput::Reference(value.to_string()))
    }

    #[tokio::test]
    async fn test_reference_must_be_own_unclaimed_upload() {
        let store = MemoryCatalog::new();
        let assets = RecordingAssets::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        store.insert_upload(alice, "1-ab-tea.png").await.unwrap();

        let stolen = StagedImage::stage(&store, &assets, bob, reference("1-ab-tea.png"), None).await;
        assert!(matches!(stolen, Err(ServiceError::Validation(_))));

        let staged = StagedImage::stage(&store, &assets, alice, reference("1-ab-tea.png"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(staged.reference, "1-ab-tea.png");

        let again = StagedImage::stage(&store, &assets, alice, reference("1-ab-tea.png"), None).await;
        assert!(matches!(again, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_current_reference_is_not_a_change() {
        let store = MemoryCatalog::new();
        let assets = RecordingAssets::new();
        let owner = Uuid::new_v4();

        let staged = StagedImage::stage(
            &store,
            &assets,
            owner,
            reference(" 1-ab-tea.png "),
            Some("1-ab-tea.png"),
        )
        .await
        .unwrap();
        assert!(staged.is_none());
    }

    #[tokio::test]
    async fn test_failed_write_returns_claim() {
        let store = MemoryCatalog::new();
        let assets = RecordingAssets::new();
        let owner = Uuid::new_v4();
        store.insert_upload(owner, "1-ab-tea.png").await.unwrap();

        let staged = StagedImage::stage(&store, &assets, owner, reference("1-ab-tea.png"), None)
            .await
            .unwrap();
        let failed: ServiceResult<()> = Err(ServiceError::Internal("write failed".into()));
        assert!(settle(&store, &assets, staged, failed).await.is_err());

        assert!(assets.deleted().is_empty());
        assert!(store.claim_upload(owner, "1-ab-tea.png").await.unwrap());
    }
}
