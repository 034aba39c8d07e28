//! HTTP surface.
//!
//! Thin plumbing over the lifecycle service: decodes request bodies, maps
//! the engine's error taxonomy onto response classes (validation -> 400,
//! provider -> 500), and encodes results as JSON.

use crate::error::EngineError;
use crate::gcp::http::format_gcp_error;
use crate::inventory::deletion::DeletionRequest;
use crate::inventory::query::QueryConfig;
use crate::inventory::service::LifecycleService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared per-process state: the service over the provider client handle.
pub struct AppState {
    pub service: LifecycleService,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/instances/list", post(list_instances))
        .route("/instances/delete", post(delete_instances))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_instances(
    State(state): State<Arc<AppState>>,
    Json(config): Json<QueryConfig>,
) -> (StatusCode, Json<Value>) {
    match state.service.list_instances(config).await {
        Ok(instances) => (StatusCode::OK, Json(json!({ "instances": instances }))),
        Err(EngineError::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": message })),
        ),
        Err(EngineError::Provider { source }) => {
            tracing::error!(error = %format!("{source:#}"), "instance listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "failed to list instances",
                    "details": format_gcp_error(&source),
                })),
            )
        }
    }
}

async fn delete_instances(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeletionRequest>,
) -> (StatusCode, Json<Value>) {
    match state.service.delete_instances(request).await {
        Ok(outcomes) => (StatusCode::OK, Json(json!({ "results": outcomes }))),
        Err(EngineError::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": message })),
        ),
        Err(EngineError::Provider { source }) => {
            tracing::error!(error = %format!("{source:#}"), "instance deletion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to delete instances" })),
            )
        }
    }
}
