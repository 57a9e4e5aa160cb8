//! Public endpoints: submit content, read approved content.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domains::submissions::NewSubmission;
use crate::server::{ApiError, AppState};

#[derive(Deserialize)]
pub struct SubmitRequest {
    /// Content type (cheatsheet, template, testcase, testscript,
    /// boilerplate); presence-checked only
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub data: Option<Value>,
    #[serde(rename = "submittedBy")]
    pub submitted_by: Option<String>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(rename = "submissionId")]
    pub submission_id: String,
}

/// POST /submissions — accept a public submission into the pending queue
pub async fn submit_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let submission_id = state
        .service
        .submit(NewSubmission {
            content_type: request.content_type.unwrap_or_default(),
            data: request.data,
            submitted_by: request.submitted_by,
        })
        .await?;

    Ok(Json(SubmitResponse {
        success: true,
        submission_id,
    }))
}

#[derive(Serialize)]
pub struct ApprovedResponse {
    pub items: Vec<Value>,
}

/// GET /approved/:type — published payloads for a type (public)
pub async fn approved_handler(
    Extension(state): Extension<AppState>,
    Path(content_type): Path<String>,
) -> Result<Json<ApprovedResponse>, ApiError> {
    let items = state.service.list_approved(&content_type).await?;
    Ok(Json(ApprovedResponse { items }))
}
