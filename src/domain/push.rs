//! Wire types for provider push notifications
//!
//! These mirror the JSON the hosting provider delivers to the webhook
//! endpoint. They are transient: only derived artifacts (suggestions,
//! health fields) are persisted.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A push notification delivered by the source-control provider.
#[derive(Debug, Clone, Deserialize)]
pub struct PushNotification {
    /// Full git reference, e.g. `refs/heads/main`.
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub repository: RepositoryInfo,
    /// Commits in the order the provider reports them (earliest first).
    #[serde(default)]
    pub commits: Vec<Commit>,
    pub pusher: Pusher,
}

/// Repository descriptor embedded in a push payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub owner: RepositoryOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOwner {
    pub name: Option<String>,
}

/// A single commit as reported in a push payload. Immutable once received.
#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    /// Commit hash.
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub author: CommitAuthor,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

impl Commit {
    /// Every path the commit touched, in added → modified → removed order.
    pub fn touched_paths(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(self.modified.iter())
            .chain(self.removed.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pusher {
    pub name: String,
    pub email: Option<String>,
}

/// A commit paired with the manifest paths it touched. Exists only for the
/// duration of a single pipeline invocation.
#[derive(Debug, Clone)]
pub struct ManifestChangeEvent {
    pub commit: Commit,
    pub matching_paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_payload_deserializes_with_renamed_ref() {
        let payload = serde_json::json!({
            "ref": "refs/heads/main",
            "repository": {
                "id": 42,
                "name": "demo",
                "full_name": "acme/demo",
                "owner": { "name": "acme" }
            },
            "commits": [{
                "id": "abc123",
                "message": "initial",
                "timestamp": "2024-05-01T12:00:00Z",
                "author": { "name": "dev", "email": "dev@acme.io" },
                "added": ["vibe.json"]
            }],
            "pusher": { "name": "dev", "email": "dev@acme.io" }
        });

        let push: PushNotification = serde_json::from_value(payload).unwrap();
        assert_eq!(push.ref_name, "refs/heads/main");
        assert_eq!(push.commits.len(), 1);
        assert_eq!(push.commits[0].modified.len(), 0);
    }

    #[test]
    fn touched_paths_unions_all_change_sets() {
        let commit = Commit {
            id: "sha".into(),
            message: "m".into(),
            timestamp: Utc::now(),
            author: CommitAuthor {
                name: "dev".into(),
                email: None,
            },
            added: vec!["a".into()],
            modified: vec!["b".into()],
            removed: vec!["c".into()],
        };
        let paths: Vec<&str> = commit.touched_paths().collect();
        assert_eq!(paths, vec!["a", "b", "c"]);
    }
}
