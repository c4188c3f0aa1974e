//! Record-store interfaces
//!
//! The record store is an external collaborator. This core only consumes a
//! keyed-record capability through these traits; the in-memory
//! implementation under `infrastructure::store` exists for the host wiring
//! and tests, not as a storage engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::{CommitSuggestion, Microservice, TrackedRepository};
use super::value_objects::HealthStatus;

/// Record-store errors surfaced at the trait boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write. For suggestions this is
    /// the `(microservice_id, commit_sha)` key.
    #[error("Record already exists: {0}")]
    Conflict(String),
    #[error("Store operation failed: {0}")]
    Unavailable(String),
}

/// Tracked-repository persistence.
#[async_trait]
pub trait ITrackedRepositoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TrackedRepository>, StoreError>;

    async fn find_by_full_name(
        &self,
        full_name: &str,
    ) -> Result<Option<TrackedRepository>, StoreError>;

    async fn create(&self, repository: &TrackedRepository) -> Result<(), StoreError>;

    async fn update(&self, repository: &TrackedRepository) -> Result<(), StoreError>;

    /// Delete a repository. Cascades to its services and their suggestions.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn count_all(&self) -> Result<i64, StoreError>;
}

/// Microservice persistence.
#[async_trait]
pub trait IMicroserviceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Microservice>, StoreError>;

    /// Resolve a service by its owning repository and manifest path. This is
    /// the lookup the suggestion synthesizer uses for each matching path.
    async fn find_by_manifest_path(
        &self,
        repository_id: Uuid,
        manifest_path: &str,
    ) -> Result<Option<Microservice>, StoreError>;

    async fn list_by_repository(
        &self,
        repository_id: Uuid,
    ) -> Result<Vec<Microservice>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Microservice>, StoreError>;

    async fn create(&self, service: &Microservice) -> Result<(), StoreError>;

    /// Update only the health-classifier-owned fields.
    async fn update_health(
        &self,
        id: Uuid,
        health_status: HealthStatus,
        last_commit_date: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    async fn count_all(&self) -> Result<i64, StoreError>;
}

/// Commit-suggestion persistence.
#[async_trait]
pub trait ISuggestionRepository: Send + Sync {
    /// Persist a new suggestion. Must reject a duplicate
    /// `(microservice_id, commit_sha)` with [`StoreError::Conflict`] so
    /// redelivered webhooks cannot double-enqueue.
    async fn create(&self, suggestion: &CommitSuggestion) -> Result<(), StoreError>;

    async fn find_by_commit(
        &self,
        microservice_id: Uuid,
        commit_sha: &str,
    ) -> Result<Option<CommitSuggestion>, StoreError>;

    async fn list_by_microservice(
        &self,
        microservice_id: Uuid,
    ) -> Result<Vec<CommitSuggestion>, StoreError>;
}
