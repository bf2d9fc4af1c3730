#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

/// In-process server on its own port, backed by an in-memory catalog and a
/// temp-dir photos directory. Each test starts its own so state never leaks;
/// the directory is removed when the server is dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub photos_dir: PathBuf,
    pub client: reqwest::Client,
    _photos: TempDir,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let photos = tempfile::tempdir().context("failed to create photos dir")?;
        let photos_dir = photos.path().to_path_buf();
        let state = catalog_api::testing::memory_state(&photos_dir).await?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let router = catalog_api::app(state, Some(photos_dir.clone()));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            photos_dir,
            client: reqwest::Client::new(),
            _photos: photos,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    /// Registers a fresh account and returns its bearer token.
    pub async fn user_token(&self, email: &str) -> Result<String> {
        let resp = self.register(email, "secret").await?;
        anyhow::ensure!(resp.status() == StatusCode::CREATED, "register failed: {}", resp.status());

        let body: Value = self.login(email, "secret").await?.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carried no token")
    }

    pub async fn post_json(&self, path: &str, token: &str, body: Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn put_json(&self, path: &str, token: &str, body: Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self.client.delete(self.url(path)).bearer_auth(token).send().await?)
    }
}

/// Multipart file part that passes the image check
pub fn png_part(file_name: &str, bytes: &'static [u8]) -> Result<reqwest::multipart::Part> {
    Ok(reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str("image/png")?)
}
