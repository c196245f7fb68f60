//! Flat-file credential store.
//!
//! One account per line: `email,salt_hex,sha256_hex`. Two-field lines
//! (`email,password`) written by older deployments are still honored at login.
//! Every lookup is a linear scan of the file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::AppError;

const SALT_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredSecret {
    Hashed { salt: String, digest: String },
    Plain(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CredentialLine {
    email: String,
    secret: StoredSecret,
}

/// Result of checking an email/password pair against the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    WrongPassword,
    UnknownAccount,
}

pub struct CredentialStore {
    path: PathBuf,
    // Readers share; register holds it exclusively across its check-then-append.
    lock: RwLock<()>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks a login in a single scan of the file.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, AppError> {
        let email = normalize_email(email)?;
        let _guard = self.lock.read().await;
        let lines = self.read_lines().await?;

        let mut known = false;
        for line in lines.iter().filter(|line| line.email == email) {
            if secret_matches(&line.secret, password) {
                return Ok(LoginOutcome::Accepted);
            }
            known = true;
        }
        Ok(if known {
            LoginOutcome::WrongPassword
        } else {
            LoginOutcome::UnknownAccount
        })
    }

    /// Appends a new account. Fails with `Conflict` if the email is already registered.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }
        let email = normalize_email(email)?;
        validate_password(password)?;

        let _guard = self.lock.write().await;
        let lines = self.read_lines().await?;
        if lines.iter().any(|line| line.email == email) {
            return Err(AppError::Conflict(
                "Email already exists. Please use a different email.".to_string(),
            ));
        }

        let salt = random_salt();
        let digest = hash_password(&salt, password);
        let record = format!("{email},{salt},{digest}\n");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.write_all(record.as_bytes())
            .await
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;
        file.flush().await.context("Failed to flush credential file")?;

        info!("Registered account {email} (name: {name})");
        Ok(())
    }

    async fn read_lines(&self) -> Result<Vec<CredentialLine>, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Internal(anyhow::Error::new(e).context(format!(
                    "Failed to read credential file {}",
                    self.path.display()
                ))))
            }
        };

        let mut lines = Vec::new();
        for (index, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some(parsed) => lines.push(parsed),
                None => warn!(
                    "Skipping malformed line {} in {}",
                    index + 1,
                    self.path.display()
                ),
            }
        }
        Ok(lines)
    }
}

fn parse_line(line: &str) -> Option<CredentialLine> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    match fields.as_slice() {
        [email, salt, digest]
            if is_hex(salt, SALT_LEN * 2) && is_hex(digest, Sha256::output_size() * 2) =>
        {
            Some(CredentialLine {
                email: email.trim().to_lowercase(),
                secret: StoredSecret::Hashed {
                    salt: (*salt).to_string(),
                    digest: (*digest).to_string(),
                },
            })
        }
        [email, password] if !email.trim().is_empty() => Some(CredentialLine {
            email: email.trim().to_lowercase(),
            secret: StoredSecret::Plain((*password).to_string()),
        }),
        _ => None,
    }
}

fn secret_matches(secret: &StoredSecret, password: &str) -> bool {
    match secret {
        StoredSecret::Hashed { salt, digest } => {
            constant_time_eq(hash_password(salt, password).as_bytes(), digest.as_bytes())
        }
        StoredSecret::Plain(stored) => constant_time_eq(stored.as_bytes(), password.as_bytes()),
    }
}

pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("email must contain '@'".to_string()));
    }
    if email.contains([',', '\n', '\r']) || email.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(
            "email contains invalid characters".to_string(),
        ));
    }
    Ok(email)
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }
    if password.contains(['\n', '\r']) {
        return Err(AppError::Validation(
            "password must not contain line breaks".to_string(),
        ));
    }
    Ok(())
}

fn random_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    to_hex(&salt)
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn is_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
