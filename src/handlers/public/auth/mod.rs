// handlers/public/auth/mod.rs - Public authentication handlers
//
// Account creation and token acquisition. Neither endpoint requires a token.

use serde::Deserialize;

pub mod login;    // POST /login - authenticate and get JWT
pub mod register; // POST /register - create new account

pub use login::login_post;
pub use register::register_post;

/// Body of both endpoints. Fields are optional so a missing one is reported
/// as a validation error rather than a JSON rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}
