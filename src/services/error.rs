use thiserror::Error;

use crate::assets::AssetError;
use crate::auth::TokenError;
use crate::database::DatabaseError;

/// Failures of the catalog operations. Messages on the client-facing
/// variants are returned verbatim in the response body.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    InvalidToken(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Credenciales incorrectas")]
    InvalidCredentials,

    #[error("Asset storage failed: {0}")]
    AssetStorage(String),

    #[error("Asset cleanup failed: {0}")]
    AssetCleanup(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(constraint) => ServiceError::Conflict(constraint),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<AssetError> for ServiceError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::Rejected(reason) => {
                ServiceError::Validation(format!("Imagen no válida: {}", reason))
            }
            AssetError::Storage(reason) => ServiceError::AssetStorage(reason),
            cleanup @ AssetError::Cleanup { .. } => ServiceError::AssetCleanup(cleanup.to_string()),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Generation(msg) => ServiceError::Internal(msg),
            TokenError::Expired | TokenError::Invalid(_) => {
                ServiceError::InvalidToken("Token inválido o expirado".to_string())
            }
        }
    }
}

impl From<bcrypt::BcryptError> for ServiceError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ServiceError::Internal(format!("password hashing: {}", err))
    }
}
