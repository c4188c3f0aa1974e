//! Persisted domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{HealthStatus, ManifestPatch, Plan};

/// A source-control repository registered for manifest tracking.
///
/// Owns the webhook secret used to verify inbound deliveries and the
/// provider-side hook id used for deregistration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedRepository {
    pub id: Uuid,
    /// `owner/name` as the provider reports it.
    pub full_name: String,
    /// Branch used for tree fetches during service discovery.
    pub default_branch: String,
    /// Shared secret for inbound webhook signature verification.
    pub webhook_secret: String,
    /// Provider-side webhook id, present once registration succeeded.
    pub webhook_id: Option<i64>,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
}

impl TrackedRepository {
    pub fn new(full_name: String, default_branch: String, plan: Plan) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name,
            default_branch,
            webhook_secret: generate_webhook_secret(),
            webhook_id: None,
            plan,
            created_at: Utc::now(),
        }
    }
}

/// Random shared secret handed to the provider at webhook registration.
fn generate_webhook_secret() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

/// A tracked service inside a repository, identified by its manifest path.
///
/// Health fields are mutated exclusively by the health classifier; the
/// status/progress fields live in the manifest itself and change only
/// through suggestion application (outside this core).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Microservice {
    pub id: Uuid,
    pub repository_id: Uuid,
    pub name: String,
    /// Repository-relative path of the service's status manifest.
    pub manifest_path: String,
    pub health_status: HealthStatus,
    pub last_commit_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Microservice {
    pub fn new(repository_id: Uuid, name: String, manifest_path: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            repository_id,
            name,
            manifest_path,
            health_status: HealthStatus::Unknown,
            last_commit_date: None,
            created_at: Utc::now(),
        }
    }
}

/// A proposed, unapplied manifest patch derived from a single commit.
///
/// Unique per `(microservice_id, commit_sha)`; re-delivery of the same push
/// must not create a second row. Only an external apply operation flips
/// `is_applied`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSuggestion {
    pub id: Uuid,
    pub microservice_id: Uuid,
    pub commit_sha: String,
    pub commit_message: String,
    pub parsed_status: Option<String>,
    pub parsed_next_steps: Vec<String>,
    pub suggested_manifest: ManifestPatch,
    pub is_applied: bool,
    pub created_at: DateTime<Utc>,
}
