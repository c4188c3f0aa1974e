//! Push-processing pipeline
//!
//! Orchestrates change extraction → tag parsing → suggestion synthesis for
//! a verified, classified push. Processing is partial-success: a failure on
//! one commit is collected and the remaining commits still run. Only a
//! record-store outage aborts the delivery so the provider can redeliver.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::event::is_default_branch;
use crate::domain::push::PushNotification;
use crate::domain::repositories::{IMicroserviceRepository, ISuggestionRepository, StoreError};

use super::extractor::extract_manifest_changes;
use super::synthesizer::synthesize_suggestion;
use super::tag_parser::parse_commit_tags;

/// Result summary for one webhook delivery.
#[derive(Debug, Default)]
pub struct PushSummary {
    pub suggestions_created: usize,
    /// Per-commit failures that did not abort the batch.
    pub errors: Vec<String>,
    /// True when the push targeted a non-default branch and was skipped.
    pub branch_skipped: bool,
}

/// Errors that abort a delivery entirely. Surfaced as a failed response so
/// the provider's retry mechanism redelivers; this core never retries.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Record store unavailable: {0}")]
    Store(#[from] StoreError),
}

/// Use case: process one push notification for a tracked repository.
pub struct ProcessPushUseCase {
    microservice_repository: Arc<dyn IMicroserviceRepository>,
    suggestion_repository: Arc<dyn ISuggestionRepository>,
    manifest_filename: String,
}

impl ProcessPushUseCase {
    pub fn new(
        microservice_repository: Arc<dyn IMicroserviceRepository>,
        suggestion_repository: Arc<dyn ISuggestionRepository>,
        manifest_filename: String,
    ) -> Self {
        Self {
            microservice_repository,
            suggestion_repository,
            manifest_filename,
        }
    }

    /// Run the pipeline for a push already verified and classified.
    pub async fn execute(
        &self,
        repository_id: Uuid,
        push: &PushNotification,
    ) -> Result<PushSummary, PipelineError> {
        let mut summary = PushSummary::default();

        // Deliberate policy: non-default branches are acknowledged but drive
        // no synthesis.
        if !is_default_branch(&push.ref_name) {
            debug!(
                repository_id = %repository_id,
                ref_name = %push.ref_name,
                "Push to non-default branch, skipping"
            );
            summary.branch_skipped = true;
            return Ok(summary);
        }

        let changes = extract_manifest_changes(&push.commits, &self.manifest_filename);
        if changes.is_empty() {
            debug!(repository_id = %repository_id, "No manifest changes in push");
            return Ok(summary);
        }

        for event in &changes {
            let tags = parse_commit_tags(&event.commit.message);
            if tags.is_empty() {
                // Touching the manifest without tags is not a signal.
                continue;
            }

            for path in &event.matching_paths {
                let service = match self
                    .microservice_repository
                    .find_by_manifest_path(repository_id, path)
                    .await
                {
                    Ok(Some(service)) => service,
                    Ok(None) => {
                        warn!(
                            repository_id = %repository_id,
                            path = %path,
                            commit = %event.commit.id,
                            "No registered service for manifest path, skipping"
                        );
                        continue;
                    }
                    Err(StoreError::Unavailable(message)) => {
                        return Err(StoreError::Unavailable(message).into());
                    }
                    Err(e) => {
                        summary
                            .errors
                            .push(format!("commit {}: {}", event.commit.id, e));
                        continue;
                    }
                };

                let Some(suggestion) = synthesize_suggestion(service.id, &event.commit, &tags)
                else {
                    continue;
                };

                match self.suggestion_repository.create(&suggestion).await {
                    Ok(()) => {
                        info!(
                            microservice_id = %service.id,
                            commit = %suggestion.commit_sha,
                            "Suggestion created"
                        );
                        summary.suggestions_created += 1;
                    }
                    // Redelivered webhook: the suggestion already exists and
                    // must not be duplicated.
                    Err(StoreError::Conflict(_)) => {
                        debug!(
                            microservice_id = %service.id,
                            commit = %suggestion.commit_sha,
                            "Suggestion already exists, skipping duplicate"
                        );
                    }
                    Err(StoreError::Unavailable(message)) => {
                        return Err(StoreError::Unavailable(message).into());
                    }
                    Err(e) => {
                        summary
                            .errors
                            .push(format!("commit {}: {}", event.commit.id, e));
                    }
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Microservice;
    use crate::domain::push::{Commit, CommitAuthor, Pusher, RepositoryInfo, RepositoryOwner};
    use crate::infrastructure::store::memory::InMemoryStore;
    use chrono::Utc;

    fn push(ref_name: &str, commits: Vec<Commit>) -> PushNotification {
        PushNotification {
            ref_name: ref_name.into(),
            repository: RepositoryInfo {
                id: 1,
                name: "demo".into(),
                full_name: "acme/demo".into(),
                owner: RepositoryOwner {
                    name: Some("acme".into()),
                },
            },
            commits,
            pusher: Pusher {
                name: "dev".into(),
                email: None,
            },
        }
    }

    fn commit(id: &str, message: &str, modified: &[&str]) -> Commit {
        Commit {
            id: id.into(),
            message: message.into(),
            timestamp: Utc::now(),
            author: CommitAuthor {
                name: "dev".into(),
                email: None,
            },
            added: vec![],
            modified: modified.iter().map(|s| s.to_string()).collect(),
            removed: vec![],
        }
    }

    async fn fixture() -> (ProcessPushUseCase, Arc<InMemoryStore>, Uuid, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let repository_id = Uuid::new_v4();
        let service = Microservice::new(repository_id, "api".into(), "services/api/vibe.json".into());
        let service_id = service.id;
        store.seed_microservice(service).await;

        let use_case = ProcessPushUseCase::new(
            store.clone(),
            store.clone(),
            "vibe.json".into(),
        );
        (use_case, store, repository_id, service_id)
    }

    #[tokio::test]
    async fn tagged_manifest_commit_creates_one_suggestion() {
        let (use_case, store, repository_id, service_id) = fixture().await;
        let delivery = push(
            "refs/heads/main",
            vec![commit(
                "sha1",
                "fix bug [STATUS:Done] [NEXT:Deploy]",
                &["services/api/vibe.json"],
            )],
        );

        let summary = use_case.execute(repository_id, &delivery).await.unwrap();
        assert_eq!(summary.suggestions_created, 1);
        assert!(summary.errors.is_empty());

        let stored = store.list_by_microservice(service_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].parsed_status.as_deref(), Some("Done"));
    }

    #[tokio::test]
    async fn feature_branch_push_is_skipped() {
        let (use_case, _store, repository_id, _) = fixture().await;
        let delivery = push(
            "refs/heads/feature/x",
            vec![commit("sha1", "[STATUS:Done]", &["services/api/vibe.json"])],
        );

        let summary = use_case.execute(repository_id, &delivery).await.unwrap();
        assert!(summary.branch_skipped);
        assert_eq!(summary.suggestions_created, 0);
    }

    #[tokio::test]
    async fn tagless_manifest_touch_creates_nothing() {
        let (use_case, _store, repository_id, _) = fixture().await;
        let delivery = push(
            "refs/heads/main",
            vec![commit("sha1", "bump version", &["services/api/vibe.json"])],
        );

        let summary = use_case.execute(repository_id, &delivery).await.unwrap();
        assert_eq!(summary.suggestions_created, 0);
        assert!(summary.errors.is_empty());
    }

    #[tokio::test]
    async fn duplicate_delivery_is_idempotent() {
        let (use_case, store, repository_id, service_id) = fixture().await;
        let delivery = push(
            "refs/heads/main",
            vec![commit(
                "sha1",
                "[STATUS:Done]",
                &["services/api/vibe.json"],
            )],
        );

        let first = use_case.execute(repository_id, &delivery).await.unwrap();
        let second = use_case.execute(repository_id, &delivery).await.unwrap();
        assert_eq!(first.suggestions_created, 1);
        assert_eq!(second.suggestions_created, 0);
        assert!(second.errors.is_empty());

        let stored = store.list_by_microservice(service_id).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn unresolvable_path_is_skipped_not_fatal() {
        let (use_case, store, repository_id, service_id) = fixture().await;
        let delivery = push(
            "refs/heads/main",
            vec![
                commit("sha1", "[STATUS:Done]", &["unregistered/vibe.json"]),
                commit("sha2", "[STATUS:Done]", &["services/api/vibe.json"]),
            ],
        );

        let summary = use_case.execute(repository_id, &delivery).await.unwrap();
        assert_eq!(summary.suggestions_created, 1);

        let stored = store.list_by_microservice(service_id).await.unwrap();
        assert_eq!(stored[0].commit_sha, "sha2");
    }
}
