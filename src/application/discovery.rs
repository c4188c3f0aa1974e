//! Service discovery
//!
//! Walks a repository's tree at registration time and registers one
//! tracked service per status manifest found. The manifest itself may name
//! the service; otherwise the parent directory (or the repository, for a
//! root manifest) does.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::entities::{Microservice, TrackedRepository};
use crate::domain::repositories::{IMicroserviceRepository, StoreError};
use crate::domain::value_objects::{QuotaResource, UsageSnapshot};
use crate::infrastructure::source_control::{SourceControlClient, SourceControlError};

use super::extractor::is_manifest_path;
use super::quota::check_quota;

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Source-control API error: {0}")]
    SourceControl(#[from] SourceControlError),
    #[error("Record store unavailable: {0}")]
    Store(#[from] StoreError),
}

/// Fields of a manifest this core cares about at discovery time. Everything
/// else in the file belongs to the dashboard collaborator.
#[derive(Debug, Deserialize)]
struct ManifestHead {
    name: Option<String>,
}

/// Use case: scan a repository tree and register its services.
pub struct DiscoverServicesUseCase {
    microservice_repository: Arc<dyn IMicroserviceRepository>,
    source_control: Arc<dyn SourceControlClient>,
    manifest_filename: String,
}

impl DiscoverServicesUseCase {
    pub fn new(
        microservice_repository: Arc<dyn IMicroserviceRepository>,
        source_control: Arc<dyn SourceControlClient>,
        manifest_filename: String,
    ) -> Self {
        Self {
            microservice_repository,
            source_control,
            manifest_filename,
        }
    }

    /// Register a service for every manifest in the repository tree that is
    /// not already tracked. Returns the newly registered services.
    pub async fn execute(
        &self,
        repository: &TrackedRepository,
    ) -> Result<Vec<Microservice>, DiscoveryError> {
        let tree = self
            .source_control
            .fetch_tree(&repository.full_name, &repository.default_branch)
            .await?;

        let mut live = self.microservice_repository.count_all().await?;
        let mut registered = Vec::new();
        for entry in tree.iter().filter(|entry| entry.is_blob()) {
            if !is_manifest_path(&entry.path, &self.manifest_filename) {
                continue;
            }

            if self
                .microservice_repository
                .find_by_manifest_path(repository.id, &entry.path)
                .await?
                .is_some()
            {
                continue;
            }

            // The quota gate runs before every service registration, so a
            // manifest-heavy tree cannot push past the plan ceiling.
            let usage = UsageSnapshot {
                microservices: live,
                ..UsageSnapshot::default()
            };
            let decision = check_quota(&usage, repository.plan, QuotaResource::Microservices);
            if !decision.allowed {
                warn!(
                    repository = %repository.full_name,
                    limit = decision.limit,
                    current = decision.current,
                    "Service quota reached, skipping remaining manifests"
                );
                break;
            }

            let name = self.resolve_service_name(repository, &entry.path).await;
            let service = Microservice::new(repository.id, name, entry.path.clone());
            self.microservice_repository.create(&service).await?;
            live += 1;
            info!(
                repository = %repository.full_name,
                manifest_path = %entry.path,
                service = %service.name,
                "Service discovered"
            );
            registered.push(service);
        }

        Ok(registered)
    }

    /// Prefer the manifest's own `name` field; fall back to the parent
    /// directory, then the repository name for a root manifest.
    async fn resolve_service_name(&self, repository: &TrackedRepository, path: &str) -> String {
        match self
            .source_control
            .fetch_file(&repository.full_name, path, &repository.default_branch)
            .await
        {
            Ok(content) => {
                if let Ok(head) = serde_json::from_str::<ManifestHead>(&content) {
                    if let Some(name) = head.name.filter(|n| !n.trim().is_empty()) {
                        return name;
                    }
                }
            }
            Err(e) => {
                warn!(
                    repository = %repository.full_name,
                    path = %path,
                    error = %e,
                    "Could not read manifest content, deriving name from path"
                );
            }
        }

        fallback_name(repository, path)
    }
}

fn fallback_name(repository: &TrackedRepository, path: &str) -> String {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    match segments.last() {
        Some(parent) => (*parent).to_string(),
        None => repository
            .full_name
            .rsplit('/')
            .next()
            .unwrap_or(&repository.full_name)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Plan;
    use crate::infrastructure::source_control::{CommitInfo, TreeEntry};
    use crate::infrastructure::store::InMemoryStore;
    use async_trait::async_trait;

    fn repo() -> TrackedRepository {
        TrackedRepository::new("acme/demo".into(), "main".into(), Plan::Free)
    }

    /// Provider stub serving a fixed tree and no readable file contents.
    struct FixedTreeClient {
        tree: Vec<TreeEntry>,
    }

    #[async_trait]
    impl SourceControlClient for FixedTreeClient {
        async fn fetch_tree(
            &self,
            _full_name: &str,
            _branch: &str,
        ) -> Result<Vec<TreeEntry>, SourceControlError> {
            Ok(self.tree.clone())
        }

        async fn fetch_file(
            &self,
            _full_name: &str,
            _path: &str,
            _branch: &str,
        ) -> Result<String, SourceControlError> {
            Err(SourceControlError::Decode("no content".into()))
        }

        async fn latest_commit(
            &self,
            _full_name: &str,
            _path: &str,
        ) -> Result<Option<CommitInfo>, SourceControlError> {
            Ok(None)
        }

        async fn create_webhook(
            &self,
            _full_name: &str,
            _callback_url: &str,
            _secret: &str,
        ) -> Result<i64, SourceControlError> {
            Ok(1)
        }

        async fn delete_webhook(
            &self,
            _full_name: &str,
            _hook_id: i64,
        ) -> Result<(), SourceControlError> {
            Ok(())
        }
    }

    fn manifest_tree(count: usize) -> Vec<TreeEntry> {
        (0..count)
            .map(|i| TreeEntry {
                path: format!("services/s{}/vibe.json", i),
                entry_type: "blob".into(),
            })
            .collect()
    }

    fn use_case_over(tree: Vec<TreeEntry>) -> (Arc<InMemoryStore>, DiscoverServicesUseCase) {
        let store = Arc::new(InMemoryStore::new());
        let client = Arc::new(FixedTreeClient { tree });
        let use_case =
            DiscoverServicesUseCase::new(store.clone(), client, "vibe.json".to_string());
        (store, use_case)
    }

    #[test]
    fn fallback_name_uses_parent_directory() {
        assert_eq!(fallback_name(&repo(), "services/api/vibe.json"), "api");
        assert_eq!(fallback_name(&repo(), "api/vibe.json"), "api");
    }

    #[test]
    fn root_manifest_falls_back_to_repository_name() {
        assert_eq!(fallback_name(&repo(), "vibe.json"), "demo");
    }

    #[tokio::test]
    async fn registration_stops_at_the_plan_service_ceiling() {
        // Free plan allows five services; the tree carries six manifests.
        let (store, use_case) = use_case_over(manifest_tree(6));

        let registered = use_case.execute(&repo()).await.unwrap();
        assert_eq!(registered.len(), 5);
        assert_eq!(IMicroserviceRepository::count_all(&*store).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn unlimited_plans_register_every_manifest() {
        let (store, use_case) = use_case_over(manifest_tree(6));
        let repository = TrackedRepository::new("acme/demo".into(), "main".into(), Plan::Team);

        let registered = use_case.execute(&repository).await.unwrap();
        assert_eq!(registered.len(), 6);
        assert_eq!(IMicroserviceRepository::count_all(&*store).await.unwrap(), 6);
    }
}
