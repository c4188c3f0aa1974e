//! GitHub REST API client

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CommitInfo, SourceControlClient, SourceControlError, TreeEntry};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("vibewatch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeNode>,
}

#[derive(Debug, Deserialize)]
struct TreeNode {
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    encoding: String,
}

#[derive(Debug, Deserialize)]
struct CommitListItem {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: CommitSignature,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct HookResponse {
    id: i64,
}

/// GitHub implementation of the source-control capability.
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client against the public GitHub API.
    pub fn new(token: Option<String>) -> Result<Self, SourceControlError> {
        Self::with_api_base(DEFAULT_API_BASE.to_string(), token)
    }

    /// Create a client against a custom API base (GitHub Enterprise, tests).
    pub fn with_api_base(
        api_base: String,
        token: Option<String>,
    ) -> Result<Self, SourceControlError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder
    }

    fn status_error(status: reqwest::StatusCode, context: impl Into<String>) -> SourceControlError {
        SourceControlError::Status {
            status: status.as_u16(),
            context: context.into(),
        }
    }
}

#[async_trait]
impl SourceControlClient for GitHubClient {
    async fn fetch_tree(
        &self,
        full_name: &str,
        branch: &str,
    ) -> Result<Vec<TreeEntry>, SourceControlError> {
        let url = format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.api_base, full_name, branch
        );
        let response = self.request(reqwest::Method::GET, url).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(
                response.status(),
                format!("tree of {}", full_name),
            ));
        }

        let tree: TreeResponse = response.json().await?;
        debug!(
            repository = %full_name,
            entries = tree.tree.len(),
            "Fetched repository tree"
        );
        Ok(tree
            .tree
            .into_iter()
            .map(|node| TreeEntry {
                path: node.path,
                entry_type: node.entry_type,
            })
            .collect())
    }

    async fn fetch_file(
        &self,
        full_name: &str,
        path: &str,
        branch: &str,
    ) -> Result<String, SourceControlError> {
        let url = format!(
            "{}/repos/{}/contents/{}?ref={}",
            self.api_base, full_name, path, branch
        );
        let response = self.request(reqwest::Method::GET, url).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(
                response.status(),
                format!("contents of {}:{}", full_name, path),
            ));
        }

        let content: ContentResponse = response.json().await?;
        if content.encoding != "base64" {
            return Err(SourceControlError::Decode(format!(
                "unexpected content encoding '{}'",
                content.encoding
            )));
        }

        // The contents API wraps base64 at 60 columns.
        let raw: String = content.content.split_whitespace().collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(raw)
            .map_err(|e| SourceControlError::Decode(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| SourceControlError::Decode(e.to_string()))
    }

    async fn latest_commit(
        &self,
        full_name: &str,
        path: &str,
    ) -> Result<Option<CommitInfo>, SourceControlError> {
        let url = format!(
            "{}/repos/{}/commits?path={}&per_page=1",
            self.api_base, full_name, path
        );
        let response = self.request(reqwest::Method::GET, url).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(
                response.status(),
                format!("commits of {}:{}", full_name, path),
            ));
        }

        let commits: Vec<CommitListItem> = response.json().await?;
        Ok(commits.into_iter().next().map(|item| CommitInfo {
            sha: item.sha,
            timestamp: item.commit.committer.date,
        }))
    }

    async fn create_webhook(
        &self,
        full_name: &str,
        callback_url: &str,
        secret: &str,
    ) -> Result<i64, SourceControlError> {
        let url = format!("{}/repos/{}/hooks", self.api_base, full_name);
        let body = serde_json::json!({
            "name": "web",
            "active": true,
            "events": ["push"],
            "config": {
                "url": callback_url,
                "content_type": "json",
                "secret": secret,
            }
        });

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::status_error(
                response.status(),
                format!("hook creation for {}", full_name),
            ));
        }

        let hook: HookResponse = response.json().await?;
        debug!(repository = %full_name, hook_id = hook.id, "Webhook registered");
        Ok(hook.id)
    }

    async fn delete_webhook(
        &self,
        full_name: &str,
        hook_id: i64,
    ) -> Result<(), SourceControlError> {
        let url = format!("{}/repos/{}/hooks/{}", self.api_base, full_name, hook_id);
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        // 404 means the hook is already gone, which is the desired state.
        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Err(Self::status_error(
                response.status(),
                format!("hook deletion for {}", full_name),
            ));
        }
        Ok(())
    }
}
