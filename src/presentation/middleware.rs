//! Request admission middleware
//!
//! Wraps every externally triggered API path in the fixed-window rate
//! limiter. Rate-limit rejections are distinguishable from auth/validation
//! failures by status 429 and by the presence of the `X-RateLimit-*`
//! headers, which are attached on success as well.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::infrastructure::rate_limiter::{FixedWindowRateLimiter, RateLimitDecision};

use super::models::ErrorResponse;

/// Shared admission-control state.
pub struct RateLimiterState {
    pub limiter: Arc<FixedWindowRateLimiter>,
    pub config: RateLimitConfig,
}

impl RateLimiterState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(FixedWindowRateLimiter::new()),
            config,
        }
    }
}

/// Client identifier for rate limiting.
///
/// Preference order: authenticated user id, first forwarded-for hop,
/// real-ip header, then a hash of the user agent so anonymous clients
/// without proxy headers still bucket separately.
fn client_key(request: &Request) -> String {
    let headers = request.headers();

    if let Some(user_id) = headers.get("x-user-id").and_then(|h| h.to_str().ok()) {
        return format!("user:{}", user_id);
    }

    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return format!("ip:{}", forwarded);
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|h| h.to_str().ok()) {
        return format!("ip:{}", real_ip);
    }

    if let Some(user_agent) = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
    {
        let digest = Sha256::digest(user_agent.as_bytes());
        return format!("ua:{}", hex::encode(&digest[..8]));
    }

    "unknown".to_string()
}

fn attach_headers(response: &mut Response, decision: &RateLimitDecision) {
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert(
        "x-ratelimit-remaining",
        HeaderValue::from(decision.remaining),
    );
    headers.insert("x-ratelimit-reset", HeaderValue::from(decision.reset_at));
}

/// Fixed-window admission middleware for the API routes.
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    let decision = state.limiter.check(
        &key,
        state.config.requests_per_window,
        state.config.window(),
    );

    if decision.allowed {
        let mut response = next.run(request).await;
        attach_headers(&mut response, &decision);
        return response;
    }

    warn!(key = %key, reset_at = decision.reset_at, "Rate limit exceeded");

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        axum::Json(ErrorResponse::new(
            "RATE_LIMIT_EXCEEDED",
            "Too many requests, try again later",
        )),
    )
        .into_response();
    attach_headers(&mut response, &decision);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_headers(pairs: &[(&str, &str)]) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/v1/quota");
        for (name, value) in pairs {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn user_id_wins_over_forwarded_for() {
        let request = request_with_headers(&[
            ("x-user-id", "u-1"),
            ("x-forwarded-for", "10.0.0.1, 10.0.0.2"),
        ]);
        assert_eq!(client_key(&request), "user:u-1");
    }

    #[test]
    fn forwarded_for_uses_first_hop() {
        let request = request_with_headers(&[("x-forwarded-for", "10.0.0.1, 10.0.0.2")]);
        assert_eq!(client_key(&request), "ip:10.0.0.1");
    }

    #[test]
    fn real_ip_is_the_next_fallback() {
        let request = request_with_headers(&[("x-real-ip", "192.168.1.5")]);
        assert_eq!(client_key(&request), "ip:192.168.1.5");
    }

    #[test]
    fn user_agent_hash_before_unknown() {
        let request = request_with_headers(&[("user-agent", "curl/8.0")]);
        let key = client_key(&request);
        assert!(key.starts_with("ua:"));

        let bare = request_with_headers(&[]);
        assert_eq!(client_key(&bare), "unknown");
    }
}
