use uuid::Uuid;

use crate::assets::AssetStore;
use crate::database::models::{Movie, NewMovie};
use crate::database::CatalogStore;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::images::{release, release_replaced, settle, StagedImage};
use crate::services::input::MovieInput;

const NOT_FOUND: &str = "Película no encontrada";

pub struct MovieService<'a> {
    store: &'a dyn CatalogStore,
    assets: &'a dyn AssetStore,
}

impl<'a> MovieService<'a> {
    pub fn new(store: &'a dyn CatalogStore, assets: &'a dyn AssetStore) -> Self {
        Self { store, assets }
    }

    pub async fn create(&self, owner: Uuid, mut input: MovieInput) -> ServiceResult<Movie> {
        let draft = input.draft()?;

        let staged =
            StagedImage::stage(self.store, self.assets, owner, input.image.take(), None).await?;
        let new = NewMovie {
            name: draft.name,
            image: staged.as_ref().map(|s| s.reference.clone()),
            genre: draft.genre,
            description: draft.description,
            scheduled_at: draft.scheduled_at,
        };

        let result = self.store.insert_movie(owner, new).await.map_err(ServiceError::from);
        settle(self.store, self.assets, staged, result).await
    }

    pub async fn list_owned(&self, owner: Uuid) -> ServiceResult<Vec<Movie>> {
        Ok(self.store.list_movies(owner).await?)
    }

    pub async fn list_public(&self) -> ServiceResult<Vec<Movie>> {
        Ok(self.store.list_all_movies().await?)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> ServiceResult<Movie> {
        self.store
            .find_movie(owner, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))
    }

    pub async fn update(&self, owner: Uuid, id: Uuid, mut input: MovieInput) -> ServiceResult<Movie> {
        let mut changes = input.changes()?;
        let existing = self.get(owner, id).await?;

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

        let result = match self.store.update_movie(owner, id, &changes).await {
            Ok(Some(movie)) => Ok(movie),
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

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> ServiceResult<Movie> {
        let movie = self
            .store
            .delete_movie(owner, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(NOT_FOUND))?;

        if let Some(reference) = movie.image.as_deref() {
            release(self.store, self.assets, reference).await;
        }
        Ok(movie)
    }
}
