//! REST endpoints for draft generation and rewriting.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::error::{LlmError, PipelineError};
use crate::pipeline::drafter::ReplyDrafter;
use crate::pipeline::types::{GenerateRequest, RewriteRequest};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no Gemini credential was configured at startup.
    pub drafter: Option<Arc<ReplyDrafter>>,
}

/// Build the Axum router with the health check and drafting routes.
pub fn api_routes(drafter: Option<Arc<ReplyDrafter>>) -> Router {
    let state = AppState { drafter };

    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .route("/api/rewrite", post(rewrite))
        .with_state(state)
        .layer(CorsLayer::very_permissive())
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

// ── Drafting ────────────────────────────────────────────────────────────

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return error_response(&e, "Failed to generate response");
    }
    let Some(drafter) = state.drafter else {
        return error_response(
            &PipelineError::from(LlmError::NotInitialized),
            "Failed to generate response",
        );
    };

    match drafter.generate(&request).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(&e, "Failed to generate response"),
    }
}

async fn rewrite(State(state): State<AppState>, Json(request): Json<RewriteRequest>) -> Response {
    if let Err(e) = request.validate() {
        return error_response(&e, "Failed to rewrite");
    }
    let Some(drafter) = state.drafter else {
        return error_response(
            &PipelineError::from(LlmError::NotInitialized),
            "Failed to rewrite",
        );
    };

    match drafter.rewrite(&request).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(&e, "Failed to rewrite"),
    }
}

/// Map a pipeline error onto a status code and `{error, message}` body.
fn error_response(err: &PipelineError, failure_label: &str) -> Response {
    let (status, label) = match err {
        PipelineError::Validation(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
        PipelineError::Llm(LlmError::NotInitialized) => {
            (StatusCode::SERVICE_UNAVAILABLE, "Service not configured")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, failure_label),
    };

    if status.is_server_error() {
        warn!(status = status.as_u16(), error = %err, "{failure_label}");
    }

    (
        status,
        Json(serde_json::json!({
            "error": label,
            "message": err.to_string(),
        })),
    )
        .into_response()
}
