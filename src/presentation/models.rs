//! API request and response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::health::SweepOutcome;
use crate::domain::value_objects::{HealthStatus, Plan, QuotaDecision, UsageSnapshot};

/// Generic error body. Coarse by design: no stack traces, no secrets, and
/// no detail about why signature verification failed.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[schema(example = "INVALID_SIGNATURE")]
    pub code: String,
    /// Human-readable message
    #[schema(example = "Webhook signature verification failed")]
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Processing result for a webhook delivery
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    pub success: bool,
    #[schema(example = "Processed push: 1 suggestion created")]
    pub message: String,
    /// Number of suggestions created by this delivery (push events only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions_created: Option<usize>,
    /// Per-commit failures that did not abort the batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl WebhookResponse {
    /// Static acknowledgment for ping and ignored events.
    pub fn ack(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            suggestions_created: None,
            errors: None,
        }
    }
}

/// Health classification of a single service
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceHealthResponse {
    pub microservice_id: Uuid,
    pub name: String,
    pub health_status: HealthStatus,
    pub last_commit_date: Option<DateTime<Utc>>,
}

/// Result of a full health sweep
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepResponse {
    pub success: bool,
    pub outcome: SweepOutcome,
}

/// Quota snapshot for a plan
#[derive(Debug, Serialize, ToSchema)]
pub struct QuotaResponse {
    pub plan: Plan,
    pub usage: UsageSnapshot,
    pub repositories: QuotaDecision,
    pub microservices: QuotaDecision,
    pub team_members: QuotaDecision,
}

/// Query parameters for the quota endpoint
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct QuotaQuery {
    /// Plan to evaluate against; defaults to free
    pub plan: Option<Plan>,
    /// Team-member count supplied by the (external) team management system
    pub team_members: Option<i64>,
}

/// Request to register a repository for tracking
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRepositoryRequest {
    /// `owner/name` as the provider reports it
    #[schema(example = "acme/demo")]
    pub full_name: String,
    /// Branch used for service discovery; defaults to `main`
    #[schema(example = "main")]
    pub default_branch: Option<String>,
    /// Owning account's plan; defaults to free
    pub plan: Option<Plan>,
}

/// Summary of a discovered service
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceSummary {
    pub id: Uuid,
    pub name: String,
    pub manifest_path: String,
}

/// Result of repository registration
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterRepositoryResponse {
    pub id: Uuid,
    pub full_name: String,
    pub default_branch: String,
    /// Provider-side webhook id; absent when registration was best-effort
    /// and failed
    pub webhook_id: Option<i64>,
    pub services: Vec<ServiceSummary>,
}

/// Liveness response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "0.1.0")]
    pub version: String,
}
