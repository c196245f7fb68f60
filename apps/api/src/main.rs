mod analysis;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod upload;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::analysis::jobs::JobCatalog;
use crate::auth::credentials::CredentialStore;
use crate::config::{Config, S3Settings};
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::upload::storage::{LocalUploadStore, S3UploadStore, UploadStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite (migrations run on connect)
    let db = create_pool(&config.database_url).await?;

    // Credential file is scanned per request; it need not exist yet
    let credentials = Arc::new(CredentialStore::new(config.users_file.clone()));
    info!("Credential file: {}", credentials.path().display());

    // Initialize upload storage
    let uploads: Arc<dyn UploadStore> = match &config.s3 {
        Some(s3) => Arc::new(S3UploadStore::new(
            build_s3_client(s3).await,
            s3.bucket.clone(),
        )),
        None => Arc::new(LocalUploadStore::open(&config.upload_dir).await?),
    };
    info!("Upload store initialized (backend: {})", uploads.backend());

    // Job catalog: built-in unless JOB_CATALOG_PATH overrides it
    let catalog = match &config.job_catalog_path {
        Some(path) => JobCatalog::load(path).await?,
        None => JobCatalog::builtin(),
    };
    info!("Job catalog has {} titles", catalog.jobs().len());

    let state = AppState {
        db,
        credentials,
        uploads,
        catalog: Arc::new(catalog),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(settings: &S3Settings) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &settings.access_key_id,
        &settings.secret_access_key,
        None,
        None,
        "skillmatch-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&settings.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
