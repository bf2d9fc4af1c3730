use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{AssetError, AssetStore, ImageUpload};
use crate::config::MediaHostConfig;

/// Stores images on a Cloudinary-compatible media host. The reference is
/// the `secure_url` returned by the upload call.
pub struct RemoteAssetStore {
    client: reqwest::Client,
    config: MediaHostConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<HostError>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: Option<String>,
    error: Option<HostError>,
}

#[derive(Debug, Deserialize)]
struct HostError {
    message: String,
}

impl RemoteAssetStore {
    pub fn new(config: MediaHostConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }
}

/// SHA-256 request signature: the params sorted by key, joined as
/// `k=v&k=v`, followed by the API secret.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Recovers the host's public id from a delivery URL such as
/// `https://res.cloudinary.com/<cloud>/image/upload/v1700000000/catalog/abc.jpg`
/// (→ `catalog/abc`). Returns `None` for anything not shaped like that.
pub fn public_id_from_url(reference: &str) -> Option<String> {
    let url = url::Url::parse(reference).ok()?;
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

    let upload_at = segments.iter().position(|s| *s == "upload")?;
    let mut rest = &segments[upload_at + 1..];

    if let Some(first) = rest.first() {
        let is_version = first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit());
        if is_version {
            rest = &rest[1..];
        }
    }

    let (last, dirs) = rest.split_last()?;
    let stem = match last.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => *last,
    };

    let mut parts: Vec<&str> = dirs.to_vec();
    parts.push(stem);
    Some(parts.join("/"))
}

#[async_trait]
impl AssetStore for RemoteAssetStore {
    async fn store(&self, upload: ImageUpload) -> Result<String, AssetError> {
        upload.validate()?;

        let public_id = Uuid::new_v4().simple().to_string();
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("folder", self.config.folder.as_str()),
                ("overwrite", "false"),
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let mut file = Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name.clone());
        if let Some(ct) = &upload.content_type {
            file = file
                .mime_str(ct)
                .map_err(|e| AssetError::Rejected(e.to_string()))?;
        }

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("overwrite", "false")
            .text("public_id", public_id)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AssetError::Storage(e.to_string()))?;

        let status = response.status();
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AssetError::Storage(format!("unreadable upload response: {}", e)))?;

        match (status.is_success(), body.secure_url, body.error) {
            (true, Some(url), _) => {
                tracing::debug!("Uploaded image to media host: {}", url);
                Ok(url)
            }
            (_, _, Some(err)) => Err(AssetError::Storage(err.message)),
            _ => Err(AssetError::Storage(format!("media host answered {}", status))),
        }
    }

    async fn delete(&self, reference: &str) -> Result<(), AssetError> {
        let Some(public_id) = public_id_from_url(reference) else {
            tracing::warn!("Ignoring unresolvable asset reference '{}'", reference);
            return Ok(());
        };

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let cleanup_err = |reason: String| AssetError::Cleanup {
            reference: reference.to_string(),
            reason,
        };

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(|e| cleanup_err(e.to_string()))?;

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| cleanup_err(format!("unreadable destroy response: {}", e)))?;

        match (body.result.as_deref(), body.error) {
            (Some("ok"), _) | (Some("not found"), _) => Ok(()),
            (_, Some(err)) => Err(cleanup_err(err.message)),
            (other, None) => Err(cleanup_err(format!("unexpected result {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_from_versioned_url() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1700000000/catalog/3f2a9c.jpg";
        assert_eq!(public_id_from_url(url).as_deref(), Some("catalog/3f2a9c"));
    }

    #[test]
    fn test_public_id_without_version_or_folder() {
        let url = "https://res.cloudinary.com/demo/image/upload/sample.png";
        assert_eq!(public_id_from_url(url).as_deref(), Some("sample"));
    }

    #[test]
    fn test_public_id_keeps_inner_dots() {
        let url = "https://res.cloudinary.com/demo/image/upload/v12/catalog/my.photo.webp";
        assert_eq!(public_id_from_url(url).as_deref(), Some("catalog/my.photo"));
    }

    #[test]
    fn test_public_id_rejects_other_shapes() {
        assert_eq!(public_id_from_url("1700000000-ab12cd34-cat.png"), None);
        assert_eq!(public_id_from_url("https://example.com/photos/cat.png"), None);
        assert_eq!(public_id_from_url("https://res.cloudinary.com/demo/image/upload/"), None);
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = sign_params(&[("timestamp", "1"), ("public_id", "x")], "secret");
        let b = sign_params(&[("public_id", "x"), ("timestamp", "1")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_signature_matches_manual_digest() {
        let expected = format!("{:x}", Sha256::digest(b"public_id=x&timestamp=1secret"));
        assert_eq!(sign_params(&[("public_id", "x"), ("timestamp", "1")], "secret"), expected);
    }

    fn host_config(api_url: &str) -> MediaHostConfig {
        MediaHostConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            folder: "catalog".to_string(),
            api_url: api_url.to_string(),
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let store = RemoteAssetStore::new(host_config("https://api.cloudinary.com/"));
        assert_eq!(
            store.endpoint("destroy"),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }

    mod host {
        use super::*;
        use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
        use bytes::Bytes;
        use serde_json::{json, Value};
        use std::collections::HashMap;
        use std::sync::{Arc, Mutex};

        const DELIVERY_URL: &str =
            "https://res.cloudinary.com/demo/image/upload/v1700000000/catalog/3f2a9c.png";

        /// Canned media host: every call answers `status` with a fixed body
        /// and destroy calls record the public id they asked for.
        #[derive(Clone)]
        struct StubHost {
            status: StatusCode,
            upload: Value,
            destroy: Value,
            destroyed: Arc<Mutex<Vec<String>>>,
        }

        impl StubHost {
            fn new(status: StatusCode, upload: Value, destroy: Value) -> Self {
                Self {
                    status,
                    upload,
                    destroy,
                    destroyed: Arc::default(),
                }
            }

            fn destroyed(&self) -> Vec<String> {
                self.destroyed.lock().unwrap().clone()
            }

            async fn serve(&self) -> RemoteAssetStore {
                let port = portpicker::pick_unused_port().unwrap();
                let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await.unwrap();
                let router = Router::new()
                    .route("/v1_1/demo/image/upload", post(upload_stub))
                    .route("/v1_1/demo/image/destroy", post(destroy_stub))
                    .with_state(self.clone());
                tokio::spawn(async move {
                    let _ = axum::serve(listener, router).await;
                });
                RemoteAssetStore::new(host_config(&format!("http://127.0.0.1:{}", port)))
            }
        }

        async fn upload_stub(State(host): State<StubHost>, _body: Bytes) -> (StatusCode, Json<Value>) {
            (host.status, Json(host.upload))
        }

        async fn destroy_stub(
            State(host): State<StubHost>,
            axum::Form(params): axum::Form<HashMap<String, String>>,
        ) -> (StatusCode, Json<Value>) {
            if let Some(public_id) = params.get("public_id") {
                host.destroyed.lock().unwrap().push(public_id.clone());
            }
            (host.status, Json(host.destroy))
        }

        fn png() -> ImageUpload {
            ImageUpload {
                file_name: "tea.png".to_string(),
                content_type: Some("image/png".to_string()),
                bytes: Bytes::from_static(b"png"),
            }
        }

        fn host_error() -> Value {
            json!({ "error": { "message": "Invalid Signature" } })
        }

        #[tokio::test]
        async fn test_store_returns_secure_url() {
            let host = StubHost::new(StatusCode::OK, json!({ "secure_url": DELIVERY_URL }), json!({}));
            let store = host.serve().await;
            assert_eq!(store.store(png()).await.unwrap(), DELIVERY_URL);
        }

        #[tokio::test]
        async fn test_store_error_body_is_storage_failure() {
            let host = StubHost::new(StatusCode::UNAUTHORIZED, host_error(), json!({}));
            let store = host.serve().await;
            match store.store(png()).await {
                Err(AssetError::Storage(reason)) => assert_eq!(reason, "Invalid Signature"),
                other => panic!("expected storage failure, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_delete_of_missing_asset_succeeds() {
            let host = StubHost::new(StatusCode::OK, json!({}), json!({ "result": "not found" }));
            let store = host.serve().await;
            store.delete(DELIVERY_URL).await.unwrap();
            assert_eq!(host.destroyed(), vec!["catalog/3f2a9c".to_string()]);
        }

        #[tokio::test]
        async fn test_delete_error_body_is_cleanup_failure() {
            let host = StubHost::new(StatusCode::UNAUTHORIZED, json!({}), host_error());
            let store = host.serve().await;
            match store.delete(DELIVERY_URL).await {
                Err(AssetError::Cleanup { reference, reason }) => {
                    assert_eq!(reference, DELIVERY_URL);
                    assert_eq!(reason, "Invalid Signature");
                }
                other => panic!("expected cleanup failure, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_unresolvable_reference_is_not_sent() {
            let host = StubHost::new(StatusCode::OK, json!({}), host_error());
            let store = host.serve().await;
            store.delete("1700000000-ab12cd34-tea.png").await.unwrap();
            assert!(host.destroyed().is_empty());
        }
    }
}
