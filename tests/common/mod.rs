//! Shared integration-test fixture: a full router over an in-memory store
//! seeded with one tracked repository and one tracked service.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;

use vibewatch::application::discovery::DiscoverServicesUseCase;
use vibewatch::application::health::HealthSweepService;
use vibewatch::application::pipeline::ProcessPushUseCase;
use vibewatch::config::Config;
use vibewatch::domain::entities::{Microservice, TrackedRepository};
use vibewatch::domain::value_objects::Plan;
use vibewatch::infrastructure::signature::sign_body;
use vibewatch::infrastructure::source_control::{GitHubClient, SourceControlClient};
use vibewatch::infrastructure::store::InMemoryStore;
use vibewatch::presentation::middleware::RateLimiterState;
use vibewatch::presentation::{create_router, AppState};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub repository: TrackedRepository,
    pub service: Microservice,
}

/// Default fixture: rate limiting off, provider pointed at a dead address
/// so any accidental outbound call fails loudly.
pub async fn test_app() -> TestApp {
    let mut config = Config::default();
    config.server.rate_limit.enabled = false;
    test_app_with(config, "http://127.0.0.1:9").await
}

pub async fn test_app_with(config: Config, api_base: &str) -> TestApp {
    let config = Arc::new(config);
    let store = Arc::new(InMemoryStore::new());
    let source_control: Arc<dyn SourceControlClient> = Arc::new(
        GitHubClient::with_api_base(api_base.to_string(), None).unwrap(),
    );

    let repository = TrackedRepository::new("acme/demo".into(), "main".into(), Plan::Pro);
    let service = Microservice::new(
        repository.id,
        "api".into(),
        "services/api/vibe.json".into(),
    );
    store.seed_repository(repository.clone()).await;
    store.seed_microservice(service.clone()).await;

    let process_push = Arc::new(ProcessPushUseCase::new(
        store.clone(),
        store.clone(),
        config.manifest.filename.clone(),
    ));
    let health_sweep = Arc::new(HealthSweepService::new(store.clone(), store.clone(), None));
    let discovery = Arc::new(DiscoverServicesUseCase::new(
        store.clone(),
        source_control.clone(),
        config.manifest.filename.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        tracked_repositories: store.clone(),
        microservices: store.clone(),
        suggestions: store.clone(),
        source_control,
        process_push,
        health_sweep,
        discovery,
    };

    let rate_limiter = if config.server.rate_limit.enabled {
        Some(Arc::new(RateLimiterState::new(
            config.server.rate_limit.clone(),
        )))
    } else {
        None
    };

    TestApp {
        router: create_router(state, rate_limiter),
        store,
        repository,
        service,
    }
}

/// A push payload in the provider's wire shape.
pub fn push_payload(ref_name: &str, commits: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "ref": ref_name,
        "repository": {
            "id": 42,
            "name": "demo",
            "full_name": "acme/demo",
            "owner": { "name": "acme" }
        },
        "commits": commits,
        "pusher": { "name": "dev", "email": "dev@acme.io" }
    })
}

pub fn commit(sha: &str, message: &str, modified: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "id": sha,
        "message": message,
        "timestamp": "2024-06-01T12:00:00Z",
        "author": { "name": "dev", "email": "dev@acme.io" },
        "modified": modified
    })
}

/// Build a correctly signed webhook delivery for the fixture repository.
pub fn webhook_request(
    repository: &TrackedRepository,
    event: &str,
    body: &serde_json::Value,
) -> Request<Body> {
    let bytes = serde_json::to_vec(body).unwrap();
    let signature = sign_body(&bytes, &repository.webhook_secret);
    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/webhook/github/{}", repository.id))
        .header("content-type", "application/json")
        .header("x-github-event", event)
        .header("x-hub-signature-256", signature)
        .body(Body::from(bytes))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
