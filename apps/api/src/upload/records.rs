use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::resume::ResumeRecord;

/// Inserts the resume, or overwrites `name` and `resume` if the email already has one.
pub async fn upsert_resume(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    resume: &str,
) -> Result<ResumeRecord, sqlx::Error> {
    let now = Utc::now();
    let record = sqlx::query_as::<_, ResumeRecord>(
        r#"
        INSERT INTO resumes (name, email, resume, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        ON CONFLICT(email) DO UPDATE SET
            name = excluded.name,
            resume = excluded.resume,
            updated_at = excluded.updated_at
        RETURNING id, name, email, resume, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(resume)
    .bind(now)
    .fetch_one(pool)
    .await?;

    info!("Saved resume {} for {email}", record.id);
    Ok(record)
}

pub async fn find_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<ResumeRecord>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRecord>(
        "SELECT id, name, email, resume, created_at, updated_at FROM resumes WHERE email = ?1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}
