use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// S3 destination for raw uploads. Present only when `S3_BUCKET` is set.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub users_file: PathBuf,
    pub upload_dir: PathBuf,
    pub s3: Option<S3Settings>,
    pub job_catalog_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let s3 = match lookup("S3_BUCKET").filter(|b| !b.trim().is_empty()) {
            Some(bucket) => Some(S3Settings {
                bucket,
                endpoint: require(&lookup, "S3_ENDPOINT")?,
                access_key_id: require(&lookup, "AWS_ACCESS_KEY_ID")?,
                secret_access_key: require(&lookup, "AWS_SECRET_ACCESS_KEY")?,
            }),
            None => None,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a positive integer")?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };
        if max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }

        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://resumes.db?mode=rwc".to_string()),
            users_file: lookup("USERS_FILE")
                .unwrap_or_else(|| "users.txt".to_string())
                .into(),
            upload_dir: lookup("UPLOAD_DIR")
                .unwrap_or_else(|| "uploads".to_string())
                .into(),
            s3,
            job_catalog_path: lookup("JOB_CATALOG_PATH").map(PathBuf::from),
            max_upload_bytes,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).with_context(|| {
        format!("Required environment variable '{key}' is not set (needed when S3_BUCKET is set)")
    })
}
