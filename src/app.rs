//! Application setup and wiring

use std::sync::Arc;

use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::application::discovery::DiscoverServicesUseCase;
use crate::application::health::HealthSweepService;
use crate::application::pipeline::ProcessPushUseCase;
use crate::config::Config;
use crate::infrastructure::source_control::{GitHubClient, SourceControlClient, SourceControlError};
use crate::infrastructure::store::InMemoryStore;
use crate::presentation::middleware::RateLimiterState;
use crate::presentation::{create_router, AppState};
use crate::workers::{spawn_health_sweep_worker, spawn_rate_limit_sweep_worker};

/// Handle returned from create_app for graceful shutdown coordination
pub struct AppHandle {
    pub router: Router,
    pub shutdown_token: CancellationToken,
}

/// Wire the stores, clients, use cases, and workers into a router.
pub fn create_app(config: Config) -> Result<AppHandle, SourceControlError> {
    let config = Arc::new(config);
    let shutdown_token = CancellationToken::new();

    let store = Arc::new(InMemoryStore::new());
    let source_control: Arc<dyn SourceControlClient> = Arc::new(GitHubClient::with_api_base(
        config.github.api_base.clone(),
        config.github.token.clone(),
    )?);

    let process_push = Arc::new(ProcessPushUseCase::new(
        store.clone(),
        store.clone(),
        config.manifest.filename.clone(),
    ));
    let health_sweep = Arc::new(HealthSweepService::new(
        store.clone(),
        store.clone(),
        Some(source_control.clone()),
    ));
    let discovery = Arc::new(DiscoverServicesUseCase::new(
        store.clone(),
        source_control.clone(),
        config.manifest.filename.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        tracked_repositories: store.clone(),
        microservices: store.clone(),
        suggestions: store,
        source_control,
        process_push,
        health_sweep: health_sweep.clone(),
        discovery,
    };

    let rate_limiter = if config.server.rate_limit.enabled {
        Some(Arc::new(RateLimiterState::new(
            config.server.rate_limit.clone(),
        )))
    } else {
        None
    };

    if config.health.sweep_enabled {
        spawn_health_sweep_worker(health_sweep, &config, shutdown_token.clone());
    }
    if let Some(limiter) = &rate_limiter {
        spawn_rate_limit_sweep_worker(limiter.clone(), &config, shutdown_token.clone());
    }

    let router = create_router(state, rate_limiter);

    Ok(AppHandle {
        router,
        shutdown_token,
    })
}
