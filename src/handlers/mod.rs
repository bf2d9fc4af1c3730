// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer JWT, owner-scoped)

pub mod form;
pub mod protected;
pub mod public;

pub use form::ResourceForm;
