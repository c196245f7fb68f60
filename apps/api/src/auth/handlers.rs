//! Axum route handlers for signup and login.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::credentials::{normalize_email, LoginOutcome};
use crate::errors::AppError;
use crate::state::AppState;

/// Where a client goes once authenticated.
pub const NEXT_STEP: &str = "/api/v1/upload";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub email: String,
    pub next: &'static str,
}

/// POST /api/v1/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    state
        .credentials
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            email: normalize_email(&req.email)?,
            next: NEXT_STEP,
        }),
    ))
}

/// POST /api/v1/login
///
/// Every rejection, including a malformed email, answers with the same 401.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let Ok(email) = normalize_email(&req.email) else {
        info!("Rejected login: malformed email");
        return Err(invalid_credentials());
    };

    match state.credentials.authenticate(&email, &req.password).await? {
        LoginOutcome::Accepted => {
            info!("Login succeeded for {email}");
            Ok(Json(AuthResponse {
                email,
                next: NEXT_STEP,
            }))
        }
        LoginOutcome::WrongPassword => {
            info!("Rejected login for {email}: wrong password");
            Err(invalid_credentials())
        }
        LoginOutcome::UnknownAccount => {
            info!("Rejected login for {email}: no such account");
            Err(invalid_credentials())
        }
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials. Please try again.".to_string())
}
