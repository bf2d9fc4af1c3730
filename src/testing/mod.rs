//! Test utilities: an in-memory asset store that records what happened to
//! it, and a fully wired application state that needs no database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::assets::{AssetError, AssetStore, ImageUpload, LocalAssetStore};
use crate::config::{AppConfig, ConfigError};
use crate::database::MemoryCatalog;
use crate::state::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret-key-minimum-32-characters-long";

/// Asset store that keeps references in memory. Deletes can be made to fail
/// to exercise the best-effort cleanup paths.
#[derive(Default)]
pub struct RecordingAssets {
    stored: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    fail_deletes: bool,
}

fn lock(list: &Mutex<Vec<String>>) -> MutexGuard<'_, Vec<String>> {
    list.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordingAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    /// References handed out by `store`, in order
    pub fn stored(&self) -> Vec<String> {
        lock(&self.stored).clone()
    }

    /// References successfully deleted, in order
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }
}

#[async_trait]
impl AssetStore for RecordingAssets {
    async fn store(&self, upload: ImageUpload) -> Result<String, AssetError> {
        upload.validate()?;
        let tag = Uuid::new_v4().simple().to_string();
        let reference = format!("{}-{}", &tag[..8], upload.file_name);
        lock(&self.stored).push(reference.clone());
        Ok(reference)
    }

    async fn delete(&self, reference: &str) -> Result<(), AssetError> {
        if self.fail_deletes {
            return Err(AssetError::Cleanup {
                reference: reference.to_string(),
                reason: "delete disabled".to_string(),
            });
        }
        lock(&self.deleted).push(reference.to_string());
        Ok(())
    }
}

/// Configuration with a fixed secret, the cheapest bcrypt cost and the given
/// photos directory.
pub fn test_config(photos_dir: PathBuf) -> Result<AppConfig, ConfigError> {
    let mut vars = HashMap::new();
    vars.insert("DATABASE_URL", "postgres://localhost/catalog_test".to_string());
    vars.insert("JWT_SECRET", TEST_JWT_SECRET.to_string());
    vars.insert("BCRYPT_COST", "4".to_string());
    vars.insert("PHOTOS_DIR", photos_dir.display().to_string());

    AppConfig::from_lookup(|name| vars.get(name).cloned())
}

/// Application state backed by `MemoryCatalog` and a `LocalAssetStore`
/// writing to `photos_dir`. The caller owns the directory's lifetime.
pub async fn memory_state(photos_dir: &Path) -> anyhow::Result<AppState> {
    let assets = LocalAssetStore::open(photos_dir).await?;
    let config = test_config(photos_dir.to_path_buf())?;

    Ok(AppState::new(config, Arc::new(MemoryCatalog::new()), Arc::new(assets)))
}
