//! Inbound webhook endpoint
//!
//! Order matters here: the raw body is captured and verified before any
//! JSON parsing, and an invalid signature rejects the delivery before the
//! payload is looked at.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::event::WebhookEvent;
use crate::domain::push::PushNotification;
use crate::infrastructure::signature::verify_signature;
use crate::presentation::models::{ErrorResponse, WebhookResponse};
use crate::presentation::AppState;

const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const EVENT_HEADER: &str = "x-github-event";

/// Receive a webhook delivery for a tracked repository.
#[utoipa::path(
    post,
    path = "/api/v1/webhook/github/{repository_id}",
    params(("repository_id" = Uuid, Path, description = "Tracked repository id")),
    request_body(content = String, description = "Raw provider payload, signed as delivered"),
    responses(
        (status = 200, description = "Delivery processed", body = WebhookResponse),
        (status = 400, description = "Malformed payload", body = ErrorResponse),
        (status = 401, description = "Signature verification failed", body = ErrorResponse),
        (status = 404, description = "Unknown repository", body = ErrorResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    tag = "webhook"
)]
pub async fn github_webhook(
    State(state): State<AppState>,
    Path(repository_id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let repository = match state
        .tracked_repositories
        .find_by_id(repository_id)
        .await
    {
        Ok(Some(repository)) => repository,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("UNKNOWN_REPOSITORY", "Unknown repository")),
            )
                .into_response();
        }
        Err(e) => {
            warn!(repository_id = %repository_id, error = %e, "Store lookup failed");
            return store_unavailable();
        }
    };

    // Verify against the raw bytes; re-serialized JSON does not round-trip.
    let signature = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());
    if !verify_signature(&body, signature, &repository.webhook_secret) {
        // Opaque by design: no detail about why verification failed.
        warn!(repository_id = %repository_id, "Webhook signature verification failed");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "INVALID_SIGNATURE",
                "Webhook signature verification failed",
            )),
        )
            .into_response();
    }

    let event = headers
        .get(EVENT_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(WebhookEvent::from_header)
        .unwrap_or(WebhookEvent::Unknown);

    match event {
        WebhookEvent::Ping => {
            info!(repository_id = %repository_id, "Webhook ping acknowledged");
            (StatusCode::OK, Json(WebhookResponse::ack("pong"))).into_response()
        }
        WebhookEvent::Unknown => (
            StatusCode::OK,
            Json(WebhookResponse::ack("Event ignored")),
        )
            .into_response(),
        WebhookEvent::Push => {
            let push: PushNotification = match serde_json::from_slice(&body) {
                Ok(push) => push,
                Err(e) => {
                    warn!(repository_id = %repository_id, error = %e, "Malformed push payload");
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse::new("MALFORMED_PAYLOAD", "Malformed payload")),
                    )
                        .into_response();
                }
            };

            match state.process_push.execute(repository_id, &push).await {
                Ok(summary) => {
                    let message = if summary.branch_skipped {
                        "Push to non-default branch ignored".to_string()
                    } else {
                        format!(
                            "Processed push: {} suggestion{} created",
                            summary.suggestions_created,
                            if summary.suggestions_created == 1 { "" } else { "s" }
                        )
                    };
                    let response = WebhookResponse {
                        success: true,
                        message,
                        suggestions_created: Some(summary.suggestions_created),
                        errors: if summary.errors.is_empty() {
                            None
                        } else {
                            Some(summary.errors)
                        },
                    };
                    (StatusCode::OK, Json(response)).into_response()
                }
                Err(e) => {
                    // Fail the delivery so the provider redelivers; this
                    // core does not retry.
                    warn!(repository_id = %repository_id, error = %e, "Push processing aborted");
                    store_unavailable()
                }
            }
        }
    }
}

fn store_unavailable() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
            "STORE_UNAVAILABLE",
            "Delivery could not be processed",
        )),
    )
        .into_response()
}
