// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation, token acquisition, probes and the public browsing views.
// Public listings return every owner's records without ownership checks.
//
// Security Level: None (completely public access)
// Middleware: None (no authentication or authorization)

pub mod auth;
pub mod catalog;
pub mod status;

pub use auth::*;
pub use catalog::*;
pub use status::*;
