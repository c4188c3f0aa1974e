//! HTTP API layer: routes, controllers, middleware, and DTOs

pub mod controllers;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use crate::application::discovery::DiscoverServicesUseCase;
use crate::application::health::HealthSweepService;
use crate::application::pipeline::ProcessPushUseCase;
use crate::config::Config;
use crate::domain::repositories::{
    IMicroserviceRepository, ISuggestionRepository, ITrackedRepositoryRepository,
};
use crate::infrastructure::source_control::SourceControlClient;

pub use routes::create_router;

/// Shared application state injected into the handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tracked_repositories: Arc<dyn ITrackedRepositoryRepository>,
    pub microservices: Arc<dyn IMicroserviceRepository>,
    pub suggestions: Arc<dyn ISuggestionRepository>,
    pub source_control: Arc<dyn SourceControlClient>,
    pub process_push: Arc<ProcessPushUseCase>,
    pub health_sweep: Arc<HealthSweepService>,
    pub discovery: Arc<DiscoverServicesUseCase>,
}
