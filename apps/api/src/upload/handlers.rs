//! Axum route handlers for the Upload API.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::analyze_resume;
use crate::analysis::jobs::{JobMatch, JobProfile};
use crate::auth::credentials::normalize_email;
use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::state::AppState;
use crate::upload::extract::{extract_text, secure_filename, DocumentKind};
use crate::upload::records::{find_by_email, upsert_resume};
use crate::upload::storage::upload_key;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub name: String,
    pub email: String,
    pub filename: String,
    pub document_kind: DocumentKind,
    /// Storage key of the raw file; no server path is exposed.
    pub stored_as: String,
    pub skills: Vec<String>,
    pub jobs: Vec<JobMatch>,
    pub highlighted: String,
}

#[derive(Debug, Serialize)]
pub struct JobCatalogResponse {
    pub jobs: Vec<JobProfile>,
}

#[derive(Debug, Default)]
struct UploadForm {
    name: Option<String>,
    email: Option<String>,
    resume: Option<UploadedFile>,
}

#[derive(Debug)]
struct UploadedFile {
    filename: String,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/upload
///
/// Multipart fields: `name`, `email`, `resume` (a `.txt` or `.pdf` file).
/// Stores the raw file, extracts its text, saves the record keyed by email,
/// and returns the extracted skills, recommended jobs and highlighted text.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = read_form(&mut multipart).await?;

    let name = form
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?
        .to_string();
    let email = normalize_email(form.email.as_deref().unwrap_or_default())?;

    let file = form
        .resume
        .ok_or_else(|| AppError::Validation("No file part".to_string()))?;
    if file.filename.trim().is_empty() {
        return Err(AppError::Validation("No selected file".to_string()));
    }
    let kind = DocumentKind::from_filename(&file.filename)
        .ok_or_else(|| AppError::UnsupportedMediaType("File type not allowed".to_string()))?;
    let filename = secure_filename(&file.filename)
        .ok_or_else(|| AppError::Validation("Invalid filename".to_string()))?;

    let stored_as = upload_key(&filename);
    state
        .uploads
        .put(&stored_as, file.bytes.clone(), kind.content_type())
        .await?;

    let text = extract_text(kind, file.bytes)
        .await
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the uploaded file".to_string(),
        ));
    }

    upsert_resume(&state.db, &name, &email, &text).await?;

    let analysis = analyze_resume(&text, &state.catalog);
    info!(
        "Analyzed {filename} for {email}: {} skills, {} recommended jobs",
        analysis.skills.len(),
        analysis.jobs.len()
    );

    Ok(Json(UploadResponse {
        name,
        email,
        filename,
        document_kind: kind,
        stored_as,
        skills: analysis.skills,
        jobs: analysis.jobs,
        highlighted: analysis.highlighted,
    }))
}

/// GET /api/v1/resumes?email=
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<ResumeRecord>, AppError> {
    let email = normalize_email(&params.email)?;
    let record = find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No resume stored for {email}")))?;
    Ok(Json(record))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<JobCatalogResponse> {
    Json(JobCatalogResponse {
        jobs: state.catalog.jobs().to_vec(),
    })
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => form.name = Some(field.text().await?),
            Some("email") => form.email = Some(field.text().await?),
            Some("resume") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.resume = Some(UploadedFile { filename, bytes });
            }
            _ => {}
        }
    }
    Ok(form)
}
