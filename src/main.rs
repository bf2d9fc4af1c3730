use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use catalog_api::assets::{AssetStore, LocalAssetStore, RemoteAssetStore};
use catalog_api::config::AppConfig;
use catalog_api::database::{DatabaseManager, PgCatalog};
use catalog_api::{app, AppState};

#[derive(Debug, Parser)]
#[command(name = "catalog-api", version, about = "Catalog API server")]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Do not apply pending database migrations at startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting Catalog API in {:?} mode", config.environment);
    if config.is_production() && config.security.cors_origins.is_empty() {
        tracing::warn!("SECURITY_CORS_ORIGINS is empty; any origin is allowed");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    if args.skip_migrations {
        tracing::info!("Skipping database migrations");
    } else {
        DatabaseManager::migrate(&pool)
            .await
            .context("failed to apply database migrations")?;
    }

    let (assets, photos_dir) = match config.storage.media_host.clone() {
        Some(media_host) => {
            tracing::info!("Storing images on media host cloud '{}'", media_host.cloud_name);
            (Arc::new(RemoteAssetStore::new(media_host)) as Arc<dyn AssetStore>, None)
        }
        None => {
            let local = LocalAssetStore::open(&config.storage.photos_dir)
                .await
                .context("failed to prepare the photos directory")?;
            tracing::info!("Storing images under {}", local.root().display());
            let root = local.root().to_path_buf();
            (Arc::new(local) as Arc<dyn AssetStore>, Some(root))
        }
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(config, Arc::new(PgCatalog::new(pool)), assets);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Catalog API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, photos_dir))
        .await
        .context("server error")?;
    Ok(())
}
