use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{AssetError, AssetStore, ImageUpload};

/// Stores images as files under a single directory. The reference handed
/// back is the bare file name; the directory is served at `/photos`.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| AssetError::Storage(format!("cannot create {}: {}", root.display(), e)))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a reference back to a path inside the root. Only the final
    /// component is used, so references cannot escape the directory.
    fn path_for(&self, reference: &str) -> Option<PathBuf> {
        let name = Path::new(reference).file_name()?.to_str()?;
        if name.starts_with('.') {
            return None;
        }
        Some(self.root.join(name))
    }

    async fn write_new(path: &Path, upload: &ImageUpload) -> std::io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        file.write_all(&upload.bytes).await?;
        file.sync_all().await?;
        Ok(())
    }
}

/// `<unix millis>-<8 hex>-<sanitized original name>`
pub fn asset_file_name(original: &str, now: DateTime<Utc>) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        now.timestamp_millis(),
        &tag[..8],
        sanitize_file_name(original)
    )
}

fn sanitize_file_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.chars().take(100).collect()
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn store(&self, upload: ImageUpload) -> Result<String, AssetError> {
        upload.validate()?;

        let name = asset_file_name(&upload.file_name, Utc::now());
        let path = self.root.join(&name);

        if let Err(e) = Self::write_new(&path, &upload).await {
            // Leave nothing behind unless the file already belonged to someone else.
            if e.kind() != ErrorKind::AlreadyExists {
                let _ = fs::remove_file(&path).await;
            }
            return Err(AssetError::Storage(format!("{}: {}", name, e)));
        }

        tracing::debug!("Stored image {} ({} bytes)", name, upload.bytes.len());
        Ok(name)
    }

    async fn delete(&self, reference: &str) -> Result<(), AssetError> {
        let Some(path) = self.path_for(reference) else {
            tracing::warn!("Ignoring unresolvable asset reference '{}'", reference);
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Deleted image {}", reference);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AssetError::Cleanup {
                reference: reference.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
