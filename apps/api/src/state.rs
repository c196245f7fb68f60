use std::sync::Arc;

use sqlx::SqlitePool;

use crate::analysis::jobs::JobCatalog;
use crate::auth::credentials::CredentialStore;
use crate::config::Config;
use crate::upload::storage::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub credentials: Arc<CredentialStore>,
    /// Pluggable upload store. Local directory by default, S3 when `S3_BUCKET` is set.
    pub uploads: Arc<dyn UploadStore>,
    pub catalog: Arc<JobCatalog>,
    pub config: Config,
}
