//! Fixed-window request admission
//!
//! Process-local admission control: rejected requests are dropped with a
//! retry time, never queued. Entries are created lazily per key per window
//! and are acceptable to lose on restart. No cross-process coordination is
//! attempted; multiple instances each enforce their own window, an accepted
//! precision/availability tradeoff.
//!
//! The eviction sweep is host-owned: `workers::spawn_rate_limit_sweep_worker`
//! calls [`FixedWindowRateLimiter::sweep_expired`] on an interval and stops
//! on shutdown, instead of the table cleaning itself up implicitly.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Counter state for one client key. Not durable.
#[derive(Debug, Clone)]
struct RateLimitEntry {
    count: u32,
    /// Unix seconds at which the current window ends.
    reset_at: u64,
}

/// Outcome of an admission check, carrying what callers need to build the
/// standard rate-limit response headers.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Unix seconds when the window resets. Present on rejection too, so
    /// callers can tell clients when to retry.
    pub reset_at: u64,
}

/// Fixed-window counter keyed by client identifier.
#[derive(Debug, Default)]
pub struct FixedWindowRateLimiter {
    // Single critical section per check; interleaved read-modify-write on
    // the same key must observe each other.
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl FixedWindowRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admission check against the wall clock.
    pub fn check(&self, key: &str, limit: u32, window: Duration) -> RateLimitDecision {
        self.check_at(key, limit, window, unix_now())
    }

    /// Admission check with injected time.
    ///
    /// A fresh or expired window starts at count=1 and admits; otherwise
    /// the counter increments and the request is admitted iff
    /// `count <= limit`.
    pub fn check_at(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: u64,
    ) -> RateLimitDecision {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let entry = entries
            .entry(key.to_string())
            .and_modify(|entry| {
                if now >= entry.reset_at {
                    entry.count = 0;
                    entry.reset_at = now + window.as_secs();
                }
            })
            .or_insert_with(|| RateLimitEntry {
                count: 0,
                reset_at: now + window.as_secs(),
            });

        entry.count += 1;
        let allowed = entry.count <= limit;
        RateLimitDecision {
            allowed,
            limit,
            remaining: limit.saturating_sub(entry.count),
            reset_at: entry.reset_at,
        }
    }

    /// Drop entries whose window has ended. Returns the number evicted.
    pub fn sweep_expired(&self, now: u64) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.reset_at > now);
        before - entries.len()
    }

    /// Number of live entries, for observability.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
