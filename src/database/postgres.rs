use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{
    Category, Movie, MovieChanges, NewMovie, NewProduct, Product, ProductChanges, PublicProduct,
    Upload, User,
};
use crate::database::store::{
    CatalogStore, CategoryStore, MovieStore, ProductStore, StoreResult, UploadStore, UserStore,
};

const USER_COLUMNS: &str = "id, email, password_hash, created_at";
const CATEGORY_COLUMNS: &str = "id, name, user_id, created_at, updated_at";
const PRODUCT_COLUMNS: &str =
    "id, name, description, price, image, active, category_id, user_id, created_at, updated_at";
const MOVIE_COLUMNS: &str =
    "id, name, image, genre, description, scheduled_at, user_id, created_at, updated_at";
const UPLOAD_COLUMNS: &str = "reference, user_id, linked, created_at";

/// Catalog persistence backed by PostgreSQL
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgCatalog {
    async fn insert_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl CategoryStore for PgCatalog {
    async fn insert_category(&self, owner: Uuid, name: &str) -> StoreResult<Category> {
        let sql = format!(
            "INSERT INTO categories (id, name, user_id) VALUES ($1, $2, $3) RETURNING {}",
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(category)
    }

    async fn list_categories(&self, owner: Uuid) -> StoreResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE user_id = $1 ORDER BY created_at, id",
            CATEGORY_COLUMNS
        );
        let rows = sqlx::query_as::<_, Category>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_all_categories(&self) -> StoreResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories ORDER BY created_at, id",
            CATEGORY_COLUMNS
        );
        let rows = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_category(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE id = $1 AND user_id = $2",
            CATEGORY_COLUMNS
        );
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn rename_category(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> StoreResult<Option<Category>> {
        let sql = format!(
            "UPDATE categories SET name = $3, updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            CATEGORY_COLUMNS
        );
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(owner)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_category(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Category>> {
        let sql = format!(
            "DELETE FROM categories WHERE id = $1 AND user_id = $2 RETURNING {}",
            CATEGORY_COLUMNS
        );
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl ProductStore for PgCatalog {
    async fn insert_product(&self, owner: Uuid, product: NewProduct) -> StoreResult<Product> {
        let sql = format!(
            "INSERT INTO products (id, name, description, price, image, active, category_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7) RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4())
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.image)
            .bind(product.category_id)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_products(&self, owner: Uuid) -> StoreResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE user_id = $1 ORDER BY created_at, id",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_public_products(
        &self,
        category_id: Option<Uuid>,
    ) -> StoreResult<Vec<PublicProduct>> {
        let sql = r#"
            SELECT
                p.id, p.name, p.description, p.price, p.image, p.active,
                p.category_id, p.user_id, p.created_at, p.updated_at,
                c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.active = TRUE
            AND ($1::uuid IS NULL OR p.category_id = $1)
            ORDER BY p.created_at, p.id
        "#;
        let rows = sqlx::query_as::<_, PublicProduct>(sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_product(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE id = $1 AND user_id = $2",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_product(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &ProductChanges,
    ) -> StoreResult<Option<Product>> {
        let sql = format!(
            "UPDATE products SET \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                price = COALESCE($5, price), \
                image = CASE WHEN $6 THEN $7 ELSE image END, \
                category_id = CASE WHEN $8 THEN $9 ELSE category_id END, \
                updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.price)
            .bind(changes.image.is_some())
            .bind(changes.image.clone().flatten())
            .bind(changes.category_id.is_some())
            .bind(changes.category_id.flatten())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn toggle_product(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Product>> {
        let sql = format!(
            "UPDATE products SET active = NOT active, updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_product(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Product>> {
        let sql = format!(
            "DELETE FROM products WHERE id = $1 AND user_id = $2 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_products_in_category(
        &self,
        owner: Uuid,
        category_id: Uuid,
    ) -> StoreResult<Vec<Product>> {
        let sql = format!(
            "DELETE FROM products WHERE user_id = $1 AND category_id = $2 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(owner)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl MovieStore for PgCatalog {
    async fn insert_movie(&self, owner: Uuid, movie: NewMovie) -> StoreResult<Movie> {
        let sql = format!(
            "INSERT INTO movies (id, name, image, genre, description, scheduled_at, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            MOVIE_COLUMNS
        );
        let row = sqlx::query_as::<_, Movie>(&sql)
            .bind(Uuid::new_v4())
            .bind(&movie.name)
            .bind(&movie.image)
            .bind(&movie.genre)
            .bind(&movie.description)
            .bind(movie.scheduled_at)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_movies(&self, owner: Uuid) -> StoreResult<Vec<Movie>> {
        let sql = format!(
            "SELECT {} FROM movies WHERE user_id = $1 ORDER BY created_at, id",
            MOVIE_COLUMNS
        );
        let rows = sqlx::query_as::<_, Movie>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_all_movies(&self) -> StoreResult<Vec<Movie>> {
        let sql = format!("SELECT {} FROM movies ORDER BY created_at, id", MOVIE_COLUMNS);
        let rows = sqlx::query_as::<_, Movie>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_movie(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Movie>> {
        let sql = format!(
            "SELECT {} FROM movies WHERE id = $1 AND user_id = $2",
            MOVIE_COLUMNS
        );
        let row = sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_movie(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &MovieChanges,
    ) -> StoreResult<Option<Movie>> {
        let sql = format!(
            "UPDATE movies SET \
                name = COALESCE($3, name), \
                image = CASE WHEN $4 THEN $5 ELSE image END, \
                genre = COALESCE($6, genre), \
                description = COALESCE($7, description), \
                scheduled_at = COALESCE($8, scheduled_at), \
                updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            MOVIE_COLUMNS
        );
        let row = sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.name.as_deref())
            .bind(changes.image.is_some())
            .bind(changes.image.clone().flatten())
            .bind(changes.genre.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.scheduled_at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_movie(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Movie>> {
        let sql = format!(
            "DELETE FROM movies WHERE id = $1 AND user_id = $2 RETURNING {}",
            MOVIE_COLUMNS
        );
        let row = sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl UploadStore for PgCatalog {
    async fn insert_upload(&self, owner: Uuid, reference: &str) -> StoreResult<Upload> {
        let sql = format!(
            "INSERT INTO uploads (reference, user_id) VALUES ($1, $2) RETURNING {}",
            UPLOAD_COLUMNS
        );
        let row = sqlx::query_as::<_, Upload>(&sql)
            .bind(reference)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn claim_upload(&self, owner: Uuid, reference: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE uploads SET linked = TRUE \
             WHERE reference = $1 AND user_id = $2 AND linked = FALSE",
        )
        .bind(reference)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn unclaim_upload(&self, owner: Uuid, reference: &str) -> StoreResult<()> {
        sqlx::query("UPDATE uploads SET linked = FALSE WHERE reference = $1 AND user_id = $2")
            .bind(reference)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_upload(&self, reference: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM uploads WHERE reference = $1")
            .bind(reference)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn ping(&self) -> StoreResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }
}
