//! Persistence seam for the catalog.
//!
//! Every owner-scoped method takes the caller's id and only ever matches rows
//! stamped with it, so a record owned by someone else looks exactly like a
//! record that does not exist.

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Category, Movie, MovieChanges, NewMovie, NewProduct, Product, ProductChanges, PublicProduct,
    Upload, User,
};

pub type StoreResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DatabaseError::Conflict` when the email is taken.
    async fn insert_user(&self, email: &str, password_hash: &str) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn insert_category(&self, owner: Uuid, name: &str) -> StoreResult<Category>;

    async fn list_categories(&self, owner: Uuid) -> StoreResult<Vec<Category>>;

    async fn list_all_categories(&self) -> StoreResult<Vec<Category>>;

    async fn find_category(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Category>>;

    async fn rename_category(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> StoreResult<Option<Category>>;

    async fn delete_category(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Category>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert_product(&self, owner: Uuid, product: NewProduct) -> StoreResult<Product>;

    async fn list_products(&self, owner: Uuid) -> StoreResult<Vec<Product>>;

    /// Active products of every owner, optionally restricted to one category.
    async fn list_public_products(
        &self,
        category_id: Option<Uuid>,
    ) -> StoreResult<Vec<PublicProduct>>;

    async fn find_product(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Product>>;

    async fn update_product(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &ProductChanges,
    ) -> StoreResult<Option<Product>>;

    /// Flips `active` in a single write and returns the stored row.
    async fn toggle_product(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Product>>;

    async fn delete_product(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Product>>;

    /// Removes every product of `owner` filed under `category_id` and returns them.
    async fn delete_products_in_category(
        &self,
        owner: Uuid,
        category_id: Uuid,
    ) -> StoreResult<Vec<Product>>;
}

#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn insert_movie(&self, owner: Uuid, movie: NewMovie) -> StoreResult<Movie>;

    async fn list_movies(&self, owner: Uuid) -> StoreResult<Vec<Movie>>;

    async fn list_all_movies(&self) -> StoreResult<Vec<Movie>>;

    async fn find_movie(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Movie>>;

    async fn update_movie(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &MovieChanges,
    ) -> StoreResult<Option<Movie>>;

    async fn delete_movie(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Movie>>;
}

/// Provenance of images stored through `/upload`.
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn insert_upload(&self, owner: Uuid, reference: &str) -> StoreResult<Upload>;

    /// Marks the upload as linked to a record. Returns `false` unless `owner`
    /// uploaded it and nothing has claimed it yet.
    async fn claim_upload(&self, owner: Uuid, reference: &str) -> StoreResult<bool>;

    /// Makes a claimed upload available again after the record write failed.
    async fn unclaim_upload(&self, owner: Uuid, reference: &str) -> StoreResult<()>;

    /// Forgets the upload once its asset has been released. No-op when the
    /// reference was never uploaded on its own.
    async fn delete_upload(&self, reference: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait CatalogStore: UserStore + CategoryStore + ProductStore + MovieStore + UploadStore {
    async fn ping(&self) -> StoreResult<()>;
}
