//! Liveness and service-health endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;
use uuid::Uuid;

use crate::domain::repositories::StoreError;
use crate::presentation::models::{
    ErrorResponse, HealthCheckResponse, ServiceHealthResponse, SweepResponse,
};
use crate::presentation::AppState;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthCheckResponse)),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Recompute and return the health classification of one service.
#[utoipa::path(
    get,
    path = "/api/v1/microservices/{id}/health",
    params(("id" = Uuid, Path, description = "Microservice id")),
    responses(
        (status = 200, description = "Current classification", body = ServiceHealthResponse),
        (status = 404, description = "Unknown microservice", body = ErrorResponse)
    ),
    tag = "health"
)]
pub async fn get_service_health(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.health_sweep.classify_service(id).await {
        Ok(_) => {}
        Err(StoreError::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("UNKNOWN_MICROSERVICE", "Unknown microservice")),
            )
                .into_response();
        }
        Err(e) => {
            error!(microservice_id = %id, error = %e, "Health classification failed");
            return store_unavailable();
        }
    }

    // Read back the persisted state so the response reflects storage.
    match state.microservices.find_by_id(id).await {
        Ok(Some(service)) => (
            StatusCode::OK,
            Json(ServiceHealthResponse {
                microservice_id: service.id,
                name: service.name,
                health_status: service.health_status,
                last_commit_date: service.last_commit_date,
            }),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("UNKNOWN_MICROSERVICE", "Unknown microservice")),
        )
            .into_response(),
        Err(e) => {
            error!(microservice_id = %id, error = %e, "Store lookup failed");
            store_unavailable()
        }
    }
}

/// Trigger a full health sweep.
#[utoipa::path(
    post,
    path = "/api/v1/health/sweep",
    responses(
        (status = 200, description = "Sweep completed", body = SweepResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    tag = "health"
)]
pub async fn run_health_sweep(State(state): State<AppState>) -> Response {
    match state.health_sweep.run_sweep().await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SweepResponse {
                success: true,
                outcome,
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Health sweep failed");
            store_unavailable()
        }
    }
}

fn store_unavailable() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
            "STORE_UNAVAILABLE",
            "Operation could not be completed",
        )),
    )
        .into_response()
}
