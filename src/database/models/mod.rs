pub mod category;
pub mod movie;
pub mod product;
pub mod upload;
pub mod user;

pub use category::Category;
pub use movie::{Movie, MovieChanges, NewMovie};
pub use product::{NewProduct, Product, ProductChanges, PublicProduct};
pub use upload::Upload;
pub use user::User;
