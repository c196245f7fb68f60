//! Raw upload storage — pluggable, trait-based.
//!
//! `LocalUploadStore` writes under a directory on disk (default).
//! `S3UploadStore` writes to a bucket when `S3_BUCKET` is configured.
//!
//! `AppState` holds an `Arc<dyn UploadStore>`, picked at startup from config.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use rand::RngCore;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::errors::AppError;

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Stores `body` under `key`. An existing object with the same key is an error
    /// for the local backend.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), AppError>;

    fn backend(&self) -> &'static str;
}

pub struct LocalUploadStore {
    root: PathBuf,
}

impl LocalUploadStore {
    /// Creates the upload directory if it does not exist yet.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create upload directory {}", root.display()))?;
        Ok(Self { root })
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> Result<(), AppError> {
        let path = self.root.join(key);
        let write_failed =
            |e: std::io::Error| AppError::Storage(format!("write {} failed: {e}", path.display()));

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(write_failed)?;
        file.write_all(&body).await.map_err(write_failed)?;
        file.flush().await.map_err(write_failed)?;

        info!("Stored upload ({} bytes) at {}", body.len(), path.display());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

pub struct S3UploadStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3UploadStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl UploadStore for S3UploadStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), AppError> {
        let s3_key = format!("uploads/{key}");
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&s3_key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, s3_key);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "s3"
    }
}

/// `{millis}_{random hex}_{filename}`. The random part keeps two uploads of the
/// same filename within one millisecond apart.
pub fn upload_key(filename: &str) -> String {
    format!(
        "{}_{:08x}_{filename}",
        chrono::Utc::now().timestamp_millis(),
        rand::thread_rng().next_u32()
    )
}
