//! Admin endpoints: pending queue, review verdicts, account signup.

use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domains::submissions::{AdminSignup, Submission};
use crate::kernel::Identity;
use crate::server::{ApiError, AppState};

/// Pull the bearer token out of the Authorization header.
/// Anything without the `Bearer ` scheme counts as no credential.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|token| token.to_string())
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub submissions: Vec<Submission>,
}

/// GET /admin/pending — outstanding submissions across all known types
pub async fn pending_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<PendingResponse>, ApiError> {
    let token = bearer_token(&headers);
    let submissions = state.service.list_pending(token.as_deref()).await?;
    Ok(Json(PendingResponse { submissions }))
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    #[serde(rename = "submissionId")]
    pub submission_id: Option<String>,
    pub action: Option<String>,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub submission: Submission,
}

/// POST /admin/review — approve or reject a pending submission
pub async fn review_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let token = bearer_token(&headers);
    let submission = state
        .service
        .review(
            token.as_deref(),
            &request.submission_id.unwrap_or_default(),
            &request.action.unwrap_or_default(),
        )
        .await?;

    Ok(Json(ReviewResponse {
        success: true,
        submission,
    }))
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "adminSecret")]
    pub admin_secret: Option<String>,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub user: Identity,
}

/// POST /admin/signup — provision an admin account (shared-secret gated)
pub async fn signup_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let user = state
        .service
        .signup_admin(AdminSignup {
            email: request.email.unwrap_or_default(),
            password: request.password.unwrap_or_default(),
            name: request.name.unwrap_or_default(),
            admin_secret: request.admin_secret.unwrap_or_default(),
        })
        .await?;

    Ok(Json(SignupResponse {
        success: true,
        user,
    }))
}
