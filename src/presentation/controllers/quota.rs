//! Plan quota endpoint

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::application::quota::check_quota;
use crate::domain::value_objects::{Plan, QuotaResource, UsageSnapshot};
use crate::presentation::models::{ErrorResponse, QuotaQuery, QuotaResponse};
use crate::presentation::AppState;

/// Usage snapshot plus per-resource quota decisions for a plan.
#[utoipa::path(
    get,
    path = "/api/v1/quota",
    params(QuotaQuery),
    responses(
        (status = 200, description = "Quota snapshot", body = QuotaResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    tag = "quota"
)]
pub async fn get_quota(
    State(state): State<AppState>,
    Query(query): Query<QuotaQuery>,
) -> Response {
    let plan = query.plan.unwrap_or(Plan::Free);

    let repositories = match state.tracked_repositories.count_all().await {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "Repository count failed");
            return store_unavailable();
        }
    };
    let microservices = match state.microservices.count_all().await {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "Microservice count failed");
            return store_unavailable();
        }
    };

    // Team membership lives outside this core; the caller supplies it.
    let usage = UsageSnapshot {
        repositories,
        microservices,
        team_members: query.team_members.unwrap_or(0),
    };

    (
        StatusCode::OK,
        Json(QuotaResponse {
            plan,
            usage,
            repositories: check_quota(&usage, plan, QuotaResource::Repositories),
            microservices: check_quota(&usage, plan, QuotaResource::Microservices),
            team_members: check_quota(&usage, plan, QuotaResource::TeamMembers),
        }),
    )
        .into_response()
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
