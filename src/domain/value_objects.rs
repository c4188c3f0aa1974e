//! Immutable domain values: health states, plans, quota decisions, and
//! manifest patches

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Commit-recency health classification for a tracked service.
///
/// The wire and storage representation is exactly these four strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum HealthStatus {
    Healthy,
    Stale,
    Inactive,
    Unknown,
}

impl HealthStatus {
    /// Status name for logging and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Stale => "Stale",
            HealthStatus::Inactive => "Inactive",
            HealthStatus::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A partial manifest update derived from a commit. Only the fields the
/// commit asserts are present; everything else is left untouched when the
/// suggestion is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ManifestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

/// Billing plan of the account owning a tracked repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Team,
}

impl Plan {
    /// Static per-plan resource ceilings. `-1` denotes unlimited.
    pub fn limits(&self) -> PlanLimits {
        match self {
            Plan::Free => PlanLimits {
                max_repositories: 1,
                max_microservices: 5,
                max_team_members: 2,
            },
            Plan::Pro => PlanLimits {
                max_repositories: 5,
                max_microservices: 50,
                max_team_members: 10,
            },
            Plan::Team => PlanLimits {
                max_repositories: -1,
                max_microservices: -1,
                max_team_members: -1,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Team => "team",
        }
    }
}

/// Resource ceilings for a plan. `-1` denotes unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlanLimits {
    pub max_repositories: i64,
    pub max_microservices: i64,
    pub max_team_members: i64,
}

impl PlanLimits {
    /// Ceiling for a single resource kind.
    pub fn for_resource(&self, resource: QuotaResource) -> i64 {
        match resource {
            QuotaResource::Repositories => self.max_repositories,
            QuotaResource::Microservices => self.max_microservices,
            QuotaResource::TeamMembers => self.max_team_members,
        }
    }
}

/// Resource kinds guarded by the quota gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuotaResource {
    Repositories,
    Microservices,
    TeamMembers,
}

/// Live resource counts read from the record store.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct UsageSnapshot {
    pub repositories: i64,
    pub microservices: i64,
    pub team_members: i64,
}

impl UsageSnapshot {
    /// Current count for a single resource kind.
    pub fn for_resource(&self, resource: QuotaResource) -> i64 {
        match resource {
            QuotaResource::Repositories => self.repositories,
            QuotaResource::Microservices => self.microservices,
            QuotaResource::TeamMembers => self.team_members,
        }
    }
}

/// Outcome of a quota check: the boolean decision plus the snapshot that
/// produced it, so callers can render usage without a second store read.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub current: i64,
    /// Plan ceiling for the checked resource, `-1` if unlimited.
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_wire_strings() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"Healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unknown).unwrap(),
            "\"Unknown\""
        );
        let parsed: HealthStatus = serde_json::from_str("\"Stale\"").unwrap();
        assert_eq!(parsed, HealthStatus::Stale);
    }

    #[test]
    fn manifest_patch_omits_absent_fields() {
        let patch = ManifestPatch {
            status: Some("Done".to_string()),
            next_steps: None,
            last_update: None,
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "Done" }));
    }

    #[test]
    fn team_plan_is_unlimited() {
        let limits = Plan::Team.limits();
        assert_eq!(limits.max_repositories, -1);
        assert_eq!(limits.max_microservices, -1);
        assert_eq!(limits.max_team_members, -1);
    }

    #[test]
    fn free_plan_caps_repositories_at_one() {
        assert_eq!(
            Plan::Free.limits().for_resource(QuotaResource::Repositories),
            1
        );
    }
}
