//! Source-control API capability
//!
//! The hosting provider is an external collaborator: this core only needs
//! to read trees and file contents, look up the newest commit for a path,
//! and manage webhook registrations. Calls toward the provider are
//! best-effort; this core never retries them.

pub mod github;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use github::GitHubClient;

/// Errors from the provider API boundary.
#[derive(Debug, thiserror::Error)]
pub enum SourceControlError {
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Provider returned status {status} for {context}")]
    Status {
        status: u16,
        context: String,
    },
    #[error("Unexpected provider response: {0}")]
    Decode(String),
}

/// One entry of a repository tree listing.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// Repository-relative path.
    pub path: String,
    /// Provider entry kind, `blob` for files.
    pub entry_type: String,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.entry_type == "blob"
    }
}

/// Newest commit touching a path.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub sha: String,
    pub timestamp: DateTime<Utc>,
}

/// Read and webhook operations this core consumes from the provider.
#[async_trait]
pub trait SourceControlClient: Send + Sync {
    /// Recursive tree listing of `branch`.
    async fn fetch_tree(
        &self,
        full_name: &str,
        branch: &str,
    ) -> Result<Vec<TreeEntry>, SourceControlError>;

    /// Decoded content of a single file at `branch`.
    async fn fetch_file(
        &self,
        full_name: &str,
        path: &str,
        branch: &str,
    ) -> Result<String, SourceControlError>;

    /// Newest commit touching `path`, if the path has any history.
    async fn latest_commit(
        &self,
        full_name: &str,
        path: &str,
    ) -> Result<Option<CommitInfo>, SourceControlError>;

    /// Register a push webhook; returns the provider-side hook id.
    async fn create_webhook(
        &self,
        full_name: &str,
        callback_url: &str,
        secret: &str,
    ) -> Result<i64, SourceControlError>;

    /// Remove a previously registered webhook.
    async fn delete_webhook(&self, full_name: &str, hook_id: i64)
        -> Result<(), SourceControlError>;
}
