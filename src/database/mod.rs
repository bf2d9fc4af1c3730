pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryCatalog;
pub use postgres::PgCatalog;
pub use store::{
    CatalogStore, CategoryStore, MovieStore, ProductStore, StoreResult, UploadStore, UserStore,
};
