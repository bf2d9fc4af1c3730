use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Tokens are valid for exactly one hour after issuance.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: user_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Signs and verifies identity tokens with the process-wide secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, issued_at);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Returns the user id embedded in a valid, unexpired token
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;
        Ok(data.claims.id)
    }
}

/// bcrypt hashing, run on the blocking pool
pub async fn hash_password(password: String, cost: u32) -> Result<String, bcrypt::BcryptError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .unwrap_or_else(|e| Err(bcrypt::BcryptError::Io(std::io::Error::other(e))))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, bcrypt::BcryptError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .unwrap_or_else(|e| Err(bcrypt::BcryptError::Io(std::io::Error::other(e))))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-minimum-32-characters-long";

    #[test]
    fn test_token_round_trips_user_id() {
        let issuer = TokenIssuer::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = issuer.issue(user_id).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_claims_expire_one_hour_after_issue() {
        let now = Utc::now();
        let claims = Claims::new(Uuid::new_v4(), now);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_near_end_of_window_still_accepted() {
        let issuer = TokenIssuer::new(SECRET);
        let user_id = Uuid::new_v4();
        let issued = Utc::now() - Duration::seconds(TOKEN_TTL_SECS - 30);
        let token = issuer.issue_at(user_id, issued).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new(SECRET);
        let issued = Utc::now() - Duration::seconds(TOKEN_TTL_SECS + 5);
        let token = issuer.issue_at(Uuid::new_v4(), issued).unwrap();
        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let token = TokenIssuer::new("another-secret").issue(Uuid::new_v4()).unwrap();
        let err = TokenIssuer::new(SECRET).verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = TokenIssuer::new(SECRET);
        assert!(matches!(issuer.verify("not.a.token"), Err(TokenError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_password_hash_verifies() {
        let hash = hash_password("p".to_string(), 4).await.unwrap();
        assert_ne!(hash, "p");
        assert!(verify_password("p".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }
}
