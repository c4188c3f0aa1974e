//! Use cases and application services

pub mod discovery;
pub mod extractor;
pub mod health;
pub mod pipeline;
pub mod quota;
pub mod synthesizer;
pub mod tag_parser;

pub use health::{HealthSweepService, classify_health};
pub use pipeline::{ProcessPushUseCase, PushSummary};
pub use quota::check_quota;
