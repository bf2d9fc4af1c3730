//! Image asset storage.
//!
//! An asset reference is the opaque string a record keeps in its `image`
//! column: a bare file name for the disk store, a public URL for the media
//! host. `store` never overwrites an existing asset and `delete` treats an
//! already-missing asset as success.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod local;
pub mod remote;

pub use local::LocalAssetStore;
pub use remote::RemoteAssetStore;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Rejected upload: {0}")]
    Rejected(String),

    #[error("Asset storage failed: {0}")]
    Storage(String),

    #[error("Asset cleanup failed for {reference}: {reason}")]
    Cleanup { reference: String, reason: String },
}

/// Binary image payload received with a request
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Rejects empty payloads and declared non-image content types.
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.bytes.is_empty() {
            return Err(AssetError::Rejected("empty file".to_string()));
        }
        match self.content_type.as_deref() {
            Some(ct) if !ct.starts_with("image/") => {
                Err(AssetError::Rejected(format!("unsupported content type {}", ct)))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn store(&self, upload: ImageUpload) -> Result<String, AssetError>;

    async fn delete(&self, reference: &str) -> Result<(), AssetError>;
}

/// Deletes an asset, logging instead of surfacing a failure.
pub async fn release_best_effort(assets: &dyn AssetStore, reference: &str) {
    if let Err(e) = assets.delete(reference).await {
        tracing::warn!("Best-effort asset cleanup failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: Option<&str>, bytes: &'static [u8]) -> ImageUpload {
        ImageUpload {
            file_name: "a.png".to_string(),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_validate_accepts_images() {
        assert!(upload(Some("image/png"), b"png").validate().is_ok());
        assert!(upload(None, b"png").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_other_types_and_empty() {
        assert!(matches!(
            upload(Some("text/plain"), b"hi").validate(),
            Err(AssetError::Rejected(_))
        ));
        assert!(matches!(
            upload(Some("image/png"), b"").validate(),
            Err(AssetError::Rejected(_))
        ));
    }
}
