//! In-memory record store
//!
//! Implements the repository traits over process-local maps. The suggestion
//! uniqueness constraint lives here, at the store boundary, so idempotency
//! holds under concurrent delivery without in-process locking in the
//! pipeline itself.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{CommitSuggestion, Microservice, TrackedRepository};
use crate::domain::repositories::{
    IMicroserviceRepository, ISuggestionRepository, ITrackedRepositoryRepository, StoreError,
};
use crate::domain::value_objects::HealthStatus;

#[derive(Default)]
struct Tables {
    repositories: HashMap<Uuid, TrackedRepository>,
    microservices: HashMap<Uuid, Microservice>,
    suggestions: HashMap<Uuid, CommitSuggestion>,
    /// Uniqueness index for `(microservice_id, commit_sha)`.
    suggestion_keys: HashMap<(Uuid, String), Uuid>,
}

/// Process-local record store used by the host wiring and tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/bootstrap helper: insert a repository without going through the
    /// registration flow.
    pub async fn seed_repository(&self, repository: TrackedRepository) {
        let mut tables = self.tables.write().await;
        tables.repositories.insert(repository.id, repository);
    }

    /// Test/bootstrap helper: insert a microservice directly.
    pub async fn seed_microservice(&self, service: Microservice) {
        let mut tables = self.tables.write().await;
        tables.microservices.insert(service.id, service);
    }
}

#[async_trait]
impl ITrackedRepositoryRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TrackedRepository>, StoreError> {
        Ok(self.tables.read().await.repositories.get(&id).cloned())
    }

    async fn find_by_full_name(
        &self,
        full_name: &str,
    ) -> Result<Option<TrackedRepository>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .repositories
            .values()
            .find(|repository| repository.full_name == full_name)
            .cloned())
    }

    async fn create(&self, repository: &TrackedRepository) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .repositories
            .values()
            .any(|existing| existing.full_name == repository.full_name)
        {
            return Err(StoreError::Conflict(format!(
                "repository {}",
                repository.full_name
            )));
        }
        tables.repositories.insert(repository.id, repository.clone());
        Ok(())
    }

    async fn update(&self, repository: &TrackedRepository) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.repositories.contains_key(&repository.id) {
            return Err(StoreError::NotFound(format!(
                "repository {}",
                repository.id
            )));
        }
        tables.repositories.insert(repository.id, repository.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.repositories.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("repository {}", id)));
        }

        // Cascade: services of the repository and their suggestions.
        let service_ids: Vec<Uuid> = tables
            .microservices
            .values()
            .filter(|service| service.repository_id == id)
            .map(|service| service.id)
            .collect();
        for service_id in &service_ids {
            tables.microservices.remove(service_id);
        }
        tables
            .suggestions
            .retain(|_, suggestion| !service_ids.contains(&suggestion.microservice_id));
        tables
            .suggestion_keys
            .retain(|(service_id, _), _| !service_ids.contains(service_id));
        Ok(())
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        Ok(self.tables.read().await.repositories.len() as i64)
    }
}

#[async_trait]
impl IMicroserviceRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Microservice>, StoreError> {
        Ok(self.tables.read().await.microservices.get(&id).cloned())
    }

    async fn find_by_manifest_path(
        &self,
        repository_id: Uuid,
        manifest_path: &str,
    ) -> Result<Option<Microservice>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .microservices
            .values()
            .find(|service| {
                service.repository_id == repository_id && service.manifest_path == manifest_path
            })
            .cloned())
    }

    async fn list_by_repository(
        &self,
        repository_id: Uuid,
    ) -> Result<Vec<Microservice>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .microservices
            .values()
            .filter(|service| service.repository_id == repository_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Microservice>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .microservices
            .values()
            .cloned()
            .collect())
    }

    async fn create(&self, service: &Microservice) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.microservices.values().any(|existing| {
            existing.repository_id == service.repository_id
                && existing.manifest_path == service.manifest_path
        }) {
            return Err(StoreError::Conflict(format!(
                "microservice at {}",
                service.manifest_path
            )));
        }
        tables.microservices.insert(service.id, service.clone());
        Ok(())
    }

    async fn update_health(
        &self,
        id: Uuid,
        health_status: HealthStatus,
        last_commit_date: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let service = tables
            .microservices
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("microservice {}", id)))?;
        service.health_status = health_status;
        service.last_commit_date = last_commit_date;
        Ok(())
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        Ok(self.tables.read().await.microservices.len() as i64)
    }
}

#[async_trait]
impl ISuggestionRepository for InMemoryStore {
    async fn create(&self, suggestion: &CommitSuggestion) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let key = (suggestion.microservice_id, suggestion.commit_sha.clone());
        if tables.suggestion_keys.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "suggestion for commit {}",
                suggestion.commit_sha
            )));
        }
        tables.suggestion_keys.insert(key, suggestion.id);
        tables.suggestions.insert(suggestion.id, suggestion.clone());
        Ok(())
    }

    async fn find_by_commit(
        &self,
        microservice_id: Uuid,
        commit_sha: &str,
    ) -> Result<Option<CommitSuggestion>, StoreError> {
        let tables = self.tables.read().await;
        let key = (microservice_id, commit_sha.to_string());
        Ok(tables
            .suggestion_keys
            .get(&key)
            .and_then(|id| tables.suggestions.get(id))
            .cloned())
    }

    async fn list_by_microservice(
        &self,
        microservice_id: Uuid,
    ) -> Result<Vec<CommitSuggestion>, StoreError> {
        let mut suggestions: Vec<CommitSuggestion> = self
            .tables
            .read()
            .await
            .suggestions
            .values()
            .filter(|suggestion| suggestion.microservice_id == microservice_id)
            .cloned()
            .collect();
        suggestions.sort_by_key(|suggestion| suggestion.created_at);
        Ok(suggestions)
    }
}
