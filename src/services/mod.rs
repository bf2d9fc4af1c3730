// services/mod.rs - Catalog operations shared by the HTTP handlers
//
// Each service borrows the store and asset backends from the application
// state for the duration of one request. Ownership checks live here, not in
// the handlers.

pub mod auth_service;
pub mod category_service;
pub mod error;
pub mod images;
pub mod input;
pub mod movie_service;
pub mod product_service;
pub mod upload_service;

pub use auth_service::AuthService;
pub use category_service::CategoryService;
pub use error::{ServiceError, ServiceResult};
pub use input::{ImageInput, MovieInput, ProductInput};
pub use movie_service::MovieService;
pub use product_service::ProductService;
pub use upload_service::UploadService;
