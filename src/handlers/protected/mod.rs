// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind jwt_auth_middleware, which injects AuthUser.
// Handlers pass the caller's id to the services, which only ever match
// records stamped with it.
//
// Security Level: JWT Authentication Required
// Middleware: jwt_auth_middleware (route_layer)

pub mod categories;
pub mod movies;
pub mod products;
pub mod upload;

pub use categories::*;
pub use movies::*;
pub use products::*;
pub use upload::*;
