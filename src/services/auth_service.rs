use crate::auth::{hash_password, verify_password, TokenIssuer};
use crate::database::models::User;
use crate::database::CatalogStore;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::input::non_empty;

/// Registration and login against the credential store
pub struct AuthService<'a> {
    store: &'a dyn CatalogStore,
    tokens: &'a TokenIssuer,
    bcrypt_cost: u32,
}

impl<'a> AuthService<'a> {
    pub fn new(store: &'a dyn CatalogStore, tokens: &'a TokenIssuer, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    /// Emails are compared case-insensitively, so they are stored trimmed and lowercased.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub async fn register(&self, email: Option<&str>, password: Option<&str>) -> ServiceResult<User> {
        let (email, password) = credentials(email, password)?;

        let hash = hash_password(password, self.bcrypt_cost).await?;
        let user = self.store.insert_user(&email, &hash).await.map_err(|e| match ServiceError::from(e) {
            ServiceError::Conflict(_) => ServiceError::Conflict("El usuario ya existe".to_string()),
            other => other,
        })?;

        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Returns a signed token for the matching user.
    pub async fn login(&self, email: Option<&str>, password: Option<&str>) -> ServiceResult<String> {
        let (email, password) = credentials(email, password)?;

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::not_found("Usuario no encontrado"))?;

        if !verify_password(password, user.password_hash.clone()).await? {
            tracing::debug!("Rejected login for user {}", user.id);
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(self.tokens.issue(user.id)?)
    }
}

/// Password is kept verbatim; only the email is normalized.
fn credentials(email: Option<&str>, password: Option<&str>) -> ServiceResult<(String, String)> {
    let email = non_empty(email).map(|e| AuthService::normalize_email(&e));
    let password = password.filter(|p| !p.is_empty());

    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password.to_string())),
        _ => Err(ServiceError::validation("Email y contraseña son obligatorios")),
    }
}
