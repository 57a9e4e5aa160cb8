//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::submissions::SubmissionService;
use crate::kernel::ServerDeps;
use crate::server::routes::{
    approved_handler, health_handler, pending_handler, review_handler, signup_handler,
    submit_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SubmissionService>,
}

/// Unmatched routes answer with the same `{"error": ...}` shape as
/// everything else.
async fn not_found_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}

/// Build the Axum application router.
///
/// Returns the router plus the submission service so the binary can run
/// the startup index-repair pass against the same instance.
pub fn build_app(deps: ServerDeps) -> (Router, Arc<SubmissionService>) {
    let service = Arc::new(SubmissionService::new(deps));

    let app_state = AppState {
        service: service.clone(),
    };

    // CORS: browser clients submit and read cross-origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let app = Router::new()
        .route("/submissions", post(submit_handler))
        .route("/admin/pending", get(pending_handler))
        .route("/admin/review", post(review_handler))
        .route("/admin/signup", post(signup_handler))
        .route("/approved/:type", get(approved_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        // Payloads are whole cheat sheets / scripts; allow up to 10 MB
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    (app, service)
}
