//! Core domain models, value objects, and repository interfaces

pub mod entities;
pub mod event;
pub mod push;
pub mod repositories;
pub mod value_objects;

pub use entities::{CommitSuggestion, Microservice, TrackedRepository};
pub use event::{WebhookEvent, is_default_branch};
pub use push::{Commit, PushNotification};
pub use value_objects::{
    HealthStatus, ManifestPatch, Plan, PlanLimits, QuotaDecision, QuotaResource, UsageSnapshot,
};
