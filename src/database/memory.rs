//! In-process catalog used by the integration tests. Rows live in insertion
//! order, mirroring what the Postgres listing queries return.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Category, Movie, MovieChanges, NewMovie, NewProduct, Product, ProductChanges, PublicProduct,
    Upload, User,
};
use crate::database::store::{
    CatalogStore, CategoryStore, MovieStore, ProductStore, StoreResult, UploadStore, UserStore,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<Category>,
    products: Vec<Product>,
    movies: Vec<Movie>,
    uploads: Vec<Upload>,
}

#[derive(Clone, Default)]
pub struct MemoryCatalog {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn remove_where<T, F>(rows: &mut Vec<T>, pred: F) -> Vec<T>
where
    F: Fn(&T) -> bool,
{
    let mut removed = Vec::new();
    let mut i = 0;
    while i < rows.len() {
        if pred(&rows[i]) {
            removed.push(rows.remove(i));
        } else {
            i += 1;
        }
    }
    removed
}

#[async_trait]
impl UserStore for MemoryCatalog {
    async fn insert_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(DatabaseError::Conflict("users_email_key".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl CategoryStore for MemoryCatalog {
    async fn insert_category(&self, owner: Uuid, name: &str) -> StoreResult<Category> {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self, owner: Uuid) -> StoreResult<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .filter(|c| c.user_id == owner)
            .cloned()
            .collect())
    }

    async fn list_all_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn find_category(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.id == id && c.user_id == owner)
            .cloned())
    }

    async fn rename_category(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> StoreResult<Option<Category>> {
        let mut tables = self.tables.write().await;
        let Some(category) = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id && c.user_id == owner)
        else {
            return Ok(None);
        };
        category.name = name.to_string();
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Category>> {
        let mut tables = self.tables.write().await;
        let removed = remove_where(&mut tables.categories, |c| c.id == id && c.user_id == owner);
        Ok(removed.into_iter().next())
    }
}

#[async_trait]
impl ProductStore for MemoryCatalog {
    async fn insert_product(&self, owner: Uuid, product: NewProduct) -> StoreResult<Product> {
        let now = Utc::now();
        let row = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            price: product.price,
            image: product.image,
            active: true,
            category_id: product.category_id,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.products.push(row.clone());
        Ok(row)
    }

    async fn list_products(&self, owner: Uuid) -> StoreResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect())
    }

    async fn list_public_products(
        &self,
        category_id: Option<Uuid>,
    ) -> StoreResult<Vec<PublicProduct>> {
        let tables = self.tables.read().await;
        let rows = tables
            .products
            .iter()
            .filter(|p| p.active)
            .filter(|p| category_id.map_or(true, |wanted| p.category_id == Some(wanted)))
            .map(|p| PublicProduct {
                product: p.clone(),
                category_name: p.category_id.and_then(|cid| {
                    tables
                        .categories
                        .iter()
                        .find(|c| c.id == cid)
                        .map(|c| c.name.clone())
                }),
            })
            .collect();
        Ok(rows)
    }

    async fn find_product(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .find(|p| p.id == id && p.user_id == owner)
            .cloned())
    }

    async fn update_product(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &ProductChanges,
    ) -> StoreResult<Option<Product>> {
        let mut tables = self.tables.write().await;
        let Some(product) = tables
            .products
            .iter_mut()
            .find(|p| p.id == id && p.user_id == owner)
        else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            product.name = name.clone();
        }
        if let Some(description) = &changes.description {
            product.description = description.clone();
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(image) = &changes.image {
            product.image = image.clone();
        }
        if let Some(category_id) = changes.category_id {
            product.category_id = category_id;
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn toggle_product(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Product>> {
        let mut tables = self.tables.write().await;
        let Some(product) = tables
            .products
            .iter_mut()
            .find(|p| p.id == id && p.user_id == owner)
        else {
            return Ok(None);
        };
        product.active = !product.active;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Product>> {
        let mut tables = self.tables.write().await;
        let removed = remove_where(&mut tables.products, |p| p.id == id && p.user_id == owner);
        Ok(removed.into_iter().next())
    }

    async fn delete_products_in_category(
        &self,
        owner: Uuid,
        category_id: Uuid,
    ) -> StoreResult<Vec<Product>> {
        let mut tables = self.tables.write().await;
        Ok(remove_where(&mut tables.products, |p| {
            p.user_id == owner && p.category_id == Some(category_id)
        }))
    }
}

#[async_trait]
impl MovieStore for MemoryCatalog {
    async fn insert_movie(&self, owner: Uuid, movie: NewMovie) -> StoreResult<Movie> {
        let now = Utc::now();
        let row = Movie {
            id: Uuid::new_v4(),
            name: movie.name,
            image: movie.image,
            genre: movie.genre,
            description: movie.description,
            scheduled_at: movie.scheduled_at,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.movies.push(row.clone());
        Ok(row)
    }

    async fn list_movies(&self, owner: Uuid) -> StoreResult<Vec<Movie>> {
        let tables = self.tables.read().await;
        Ok(tables
            .movies
            .iter()
            .filter(|m| m.user_id == owner)
            .cloned()
            .collect())
    }

    async fn list_all_movies(&self) -> StoreResult<Vec<Movie>> {
        Ok(self.tables.read().await.movies.clone())
    }

    async fn find_movie(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Movie>> {
        let tables = self.tables.read().await;
        Ok(tables
            .movies
            .iter()
            .find(|m| m.id == id && m.user_id == owner)
            .cloned())
    }

    async fn update_movie(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &MovieChanges,
    ) -> StoreResult<Option<Movie>> {
        let mut tables = self.tables.write().await;
        let Some(movie) = tables
            .movies
            .iter_mut()
            .find(|m| m.id == id && m.user_id == owner)
        else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            movie.name = name.clone();
        }
        if let Some(image) = &changes.image {
            movie.image = image.clone();
        }
        if let Some(genre) = &changes.genre {
            movie.genre = genre.clone();
        }
        if let Some(description) = &changes.description {
            movie.description = description.clone();
        }
        if let Some(scheduled_at) = changes.scheduled_at {
            movie.scheduled_at = scheduled_at;
        }
        movie.updated_at = Utc::now();
        Ok(Some(movie.clone()))
    }

    async fn delete_movie(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Movie>> {
        let mut tables = self.tables.write().await;
        let removed = remove_where(&mut tables.movies, |m| m.id == id && m.user_id == owner);
        Ok(removed.into_iter().next())
    }
}

#[async_trait]
impl UploadStore for MemoryCatalog {
    async fn insert_upload(&self, owner: Uuid, reference: &str) -> StoreResult<Upload> {
        let mut tables = self.tables.write().await;
        if tables.uploads.iter().any(|u| u.reference == reference) {
            return Err(DatabaseError::Conflict("uploads_pkey".to_string()));
        }
        let upload = Upload {
            reference: reference.to_string(),
            user_id: owner,
            linked: false,
            created_at: Utc::now(),
        };
        tables.uploads.push(upload.clone());
        Ok(upload)
    }

    async fn claim_upload(&self, owner: Uuid, reference: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(upload) = tables
            .uploads
            .iter_mut()
            .find(|u| u.reference == reference && u.user_id == owner && !u.linked)
        else {
            return Ok(false);
        };
        upload.linked = true;
        Ok(true)
    }

    async fn unclaim_upload(&self, owner: Uuid, reference: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(upload) = tables
            .uploads
            .iter_mut()
            .find(|u| u.reference == reference && u.user_id == owner)
        {
            upload.linked = false;
        }
        Ok(())
    }

    async fn delete_upload(&self, reference: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        remove_where(&mut tables.uploads, |u| u.reference == reference);
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
