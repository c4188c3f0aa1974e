//! External integrations: webhook signatures, rate limiting, the
//! source-control API client, and the in-memory record store

pub mod rate_limiter;
pub mod signature;
pub mod source_control;
pub mod store;
