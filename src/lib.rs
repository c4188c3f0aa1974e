//! Vibewatch - webhook-driven microservice activity tracking
//!
//! Receives signature-verified push webhooks, turns manifest-touching
//! commits with status tags into update suggestions, and classifies each
//! service's health from commit recency.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;
pub mod workers;

mod app;

pub use app::{create_app, AppHandle};
pub use config::Config;
pub use logging::init_tracing;
