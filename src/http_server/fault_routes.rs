//! Fault Control HTTP Routes
//!
//! Endpoints for arming, releasing and inspecting faults over HTTP, and the
//! call-site evaluation used by `RemoteRegistry` in worker processes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::control::{inject_fault, InjectRequest};
use crate::fault::{points, DdlStatement, FaultError};
use crate::registry::FaultRegistry;
use crate::remote::wire::{
    ArmedResponse, CompletedResponse, ControlResponse, ErrorResponse, FiredFault, TriggerRequest,
    TriggerResponse,
};

// ==================
// Request/Response Types
// ==================

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// ==================
// Routers
// ==================

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

/// Fault control routes, sharing one registry
pub fn fault_routes(registry: Arc<FaultRegistry>) -> Router {
    Router::new()
        .route("/faults", get(status_handler))
        .route("/faults/inject", post(inject_handler))
        .route("/faults/:name", get(armed_handler))
        .route("/faults/:name/completed", get(completed_handler))
        .route("/segments/trigger", post(trigger_handler))
        .with_state(registry)
}

// ==================
// Handlers
// ==================

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Status report for every armed fault
async fn status_handler(State(registry): State<Arc<FaultRegistry>>) -> Json<ControlResponse> {
    Json(ControlResponse {
        result: registry.status(points::ALL).render(),
    })
}

/// Run one control command. Suspend-style waits block, so the command runs
/// off the async workers.
async fn inject_handler(
    State(registry): State<Arc<FaultRegistry>>,
    Json(request): Json<InjectRequest>,
) -> Result<Json<ControlResponse>, ApiError> {
    let result = tokio::task::spawn_blocking(move || inject_fault(&registry, &request))
        .await
        .map_err(|err| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                    code: "FI_SERVER_TASK_FAILED".to_string(),
                }),
            )
        })?;

    match result {
        Ok(text) => Ok(Json(ControlResponse { result: text })),
        Err(err) => Err((status_for(&err), Json(ErrorResponse::from(err)))),
    }
}

/// Match and count one call-site evaluation under the registry lock. The
/// worker runs the action itself from the returned snapshot.
async fn trigger_handler(
    State(registry): State<Arc<FaultRegistry>>,
    Json(request): Json<TriggerRequest>,
) -> Result<Json<TriggerResponse>, ApiError> {
    let ddl = DdlStatement::parse(&request.ddl).ok_or_else(|| {
        let err = FaultError::UnknownDdlStatement(request.ddl.clone());
        (status_for(&err), Json(ErrorResponse::from(err)))
    })?;

    let fired = registry
        .match_and_advance(&request.name, ddl, &request.database, &request.table)
        .map(|entry| FiredFault::from(&entry));

    Ok(Json(TriggerResponse { fired }))
}

/// Current kind of one fault, polled by suspended or looping workers
async fn armed_handler(
    State(registry): State<Arc<FaultRegistry>>,
    Path(name): Path<String>,
) -> Json<ArmedResponse> {
    let kind = registry.armed_kind(&name).map(|kind| kind.as_str().to_string());
    Json(ArmedResponse { name, kind })
}

/// Completion check; removes a finished entry
async fn completed_handler(
    State(registry): State<Arc<FaultRegistry>>,
    Path(name): Path<String>,
) -> Json<CompletedResponse> {
    let completed = registry.is_completed(&name);
    Json(CompletedResponse { name, completed })
}

fn status_for(err: &FaultError) -> StatusCode {
    match err {
        FaultError::NotSet(_) => StatusCode::NOT_FOUND,
        FaultError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_REQUEST,
    }
}
