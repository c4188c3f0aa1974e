//! Repository registration endpoints
//!
//! Registration is the one resource-creating operation this service owns,
//! so it consults the quota gate first. Provider webhook calls are
//! best-effort: a failed registration or deregistration is logged and the
//! primary state change stands.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::quota::check_quota;
use crate::domain::entities::TrackedRepository;
use crate::domain::repositories::StoreError;
use crate::domain::value_objects::{Plan, QuotaResource, UsageSnapshot};
use crate::presentation::models::{
    ErrorResponse, RegisterRepositoryRequest, RegisterRepositoryResponse, ServiceSummary,
};
use crate::presentation::AppState;

/// Register a repository: quota gate, service discovery, webhook setup.
#[utoipa::path(
    post,
    path = "/api/v1/repositories",
    request_body = RegisterRepositoryRequest,
    responses(
        (status = 201, description = "Repository registered", body = RegisterRepositoryResponse),
        (status = 403, description = "Plan quota exceeded", body = ErrorResponse),
        (status = 409, description = "Repository already tracked", body = ErrorResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    tag = "repositories"
)]
pub async fn register_repository(
    State(state): State<AppState>,
    Json(request): Json<RegisterRepositoryRequest>,
) -> Response {
    let plan = request.plan.unwrap_or(Plan::Free);

    // Quota gate runs before any resource creation.
    let repositories = match state.tracked_repositories.count_all().await {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "Repository count failed");
            return store_unavailable();
        }
    };
    let usage = UsageSnapshot {
        repositories,
        ..UsageSnapshot::default()
    };
    let decision = check_quota(&usage, plan, QuotaResource::Repositories);
    if !decision.allowed {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new(
                "QUOTA_EXCEEDED",
                format!(
                    "Plan allows {} tracked repositories, {} in use",
                    decision.limit, decision.current
                ),
            )),
        )
            .into_response();
    }

    let repository = TrackedRepository::new(
        request.full_name,
        request.default_branch.unwrap_or_else(|| "main".to_string()),
        plan,
    );

    match state.tracked_repositories.create(&repository).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new(
                    "ALREADY_TRACKED",
                    "Repository is already tracked",
                )),
            )
                .into_response();
        }
        Err(e) => {
            error!(repository = %repository.full_name, error = %e, "Repository create failed");
            return store_unavailable();
        }
    }

    // Discover services from the repository tree. A provider outage here is
    // non-fatal: the repository stays registered and discovery can be redone
    // on the next sweep or registration retry.
    let services = match state.discovery.execute(&repository).await {
        Ok(services) => services,
        Err(e) => {
            warn!(repository = %repository.full_name, error = %e, "Service discovery failed");
            Vec::new()
        }
    };

    // Webhook registration is best-effort as well.
    let callback_url = format!(
        "{}/api/v1/webhook/github/{}",
        state.config.github.callback_base.trim_end_matches('/'),
        repository.id
    );
    let webhook_id = match state
        .source_control
        .create_webhook(
            &repository.full_name,
            &callback_url,
            &repository.webhook_secret,
        )
        .await
    {
        Ok(hook_id) => {
            let mut updated = repository.clone();
            updated.webhook_id = Some(hook_id);
            if let Err(e) = state.tracked_repositories.update(&updated).await {
                warn!(repository = %repository.full_name, error = %e, "Webhook id persist failed");
            }
            Some(hook_id)
        }
        Err(e) => {
            warn!(repository = %repository.full_name, error = %e, "Webhook registration failed");
            None
        }
    };

    info!(
        repository = %repository.full_name,
        services = services.len(),
        webhook = webhook_id.is_some(),
        "Repository registered"
    );

    (
        StatusCode::CREATED,
        Json(RegisterRepositoryResponse {
            id: repository.id,
            full_name: repository.full_name,
            default_branch: repository.default_branch,
            webhook_id,
            services: services
                .into_iter()
                .map(|service| ServiceSummary {
                    id: service.id,
                    name: service.name,
                    manifest_path: service.manifest_path,
                })
                .collect(),
        }),
    )
        .into_response()
}

/// Stop tracking a repository. Cascades to services and suggestions.
#[utoipa::path(
    delete,
    path = "/api/v1/repositories/{id}",
    params(("id" = Uuid, Path, description = "Tracked repository id")),
    responses(
        (status = 204, description = "Repository removed"),
        (status = 404, description = "Unknown repository", body = ErrorResponse)
    ),
    tag = "repositories"
)]
pub async fn delete_repository(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repository = match state.tracked_repositories.find_by_id(id).await {
        Ok(Some(repository)) => repository,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("UNKNOWN_REPOSITORY", "Unknown repository")),
            )
                .into_response();
        }
        Err(e) => {
            error!(repository_id = %id, error = %e, "Store lookup failed");
            return store_unavailable();
        }
    };

    if let Err(e) = state.tracked_repositories.delete(id).await {
        error!(repository_id = %id, error = %e, "Repository delete failed");
        return store_unavailable();
    }

    // Deregistration is a side channel: failure never rolls back the delete.
    if let Some(hook_id) = repository.webhook_id {
        if let Err(e) = state
            .source_control
            .delete_webhook(&repository.full_name, hook_id)
            .await
        {
            warn!(
                repository = %repository.full_name,
                hook_id,
                error = %e,
                "Webhook deregistration failed"
            );
        }
    }

    StatusCode::NO_CONTENT.into_response()
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
