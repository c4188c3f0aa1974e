//! Route table and tower layer stack

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;

use super::controllers::{health, quota, repositories, webhook};
use super::middleware::{rate_limit_middleware, RateLimiterState};
use super::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        webhook::github_webhook,
        health::health_check,
        health::get_service_health,
        health::run_health_sweep,
        quota::get_quota,
        repositories::register_repository,
        repositories::delete_repository,
    ),
    components(schemas(
        super::models::ErrorResponse,
        super::models::WebhookResponse,
        super::models::ServiceHealthResponse,
        super::models::SweepResponse,
        super::models::QuotaResponse,
        super::models::RegisterRepositoryRequest,
        super::models::RegisterRepositoryResponse,
        super::models::ServiceSummary,
        super::models::HealthCheckResponse,
        crate::application::health::SweepOutcome,
        crate::domain::value_objects::HealthStatus,
        crate::domain::value_objects::Plan,
        crate::domain::value_objects::QuotaDecision,
        crate::domain::value_objects::UsageSnapshot,
    )),
    tags(
        (name = "webhook", description = "Inbound webhook deliveries"),
        (name = "health", description = "Liveness and service health"),
        (name = "quota", description = "Plan quota evaluation"),
        (name = "repositories", description = "Repository tracking")
    ),
    info(
        title = "Vibewatch API",
        description = "Webhook-driven microservice activity tracking"
    )
)]
struct ApiDoc;

/// Build the application router.
///
/// The rate limiter state is owned by the caller so the sweep worker can
/// share the same entry map.
pub fn create_router(state: AppState, rate_limiter: Option<Arc<RateLimiterState>>) -> Router {
    let config = state.config.clone();

    let api = Router::new()
        .route(
            "/webhook/github/{repository_id}",
            post(webhook::github_webhook),
        )
        .route(
            "/microservices/{id}/health",
            get(health::get_service_health),
        )
        .route("/health/sweep", post(health::run_health_sweep))
        .route("/quota", get(quota::get_quota))
        .route("/repositories", post(repositories::register_repository))
        .route("/repositories/{id}", delete(repositories::delete_repository));

    // Rate limiting covers the API surface but not the liveness probe.
    let api = match rate_limiter {
        Some(limiter) => api.layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        )),
        None => api,
    };

    let mut router = Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health::health_check));

    if config.server.enable_docs {
        router = router.route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )))
        .layer(cors_layer(&config.server.allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
