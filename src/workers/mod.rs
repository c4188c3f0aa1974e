//! Background workers
//!
//! Periodic tasks run here so the request handlers stay synchronous-fast:
//! the health sweep recomputes every service's classification, and the
//! rate-limit sweep evicts expired admission windows.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::application::health::HealthSweepService;
use crate::config::Config;
use crate::presentation::middleware::RateLimiterState;

/// Spawn the periodic health sweep.
pub fn spawn_health_sweep_worker(
    health_sweep: Arc<HealthSweepService>,
    config: &Config,
    shutdown_token: CancellationToken,
) {
    let interval_seconds = config.health.sweep_interval_seconds;

    tokio::spawn(async move {
        info!(interval_seconds, "Health sweep worker started");

        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        // The first tick fires immediately; skip it so startup stays quiet.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match health_sweep.run_sweep().await {
                        Ok(outcome) => info!(
                            swept = outcome.swept,
                            healthy = outcome.healthy,
                            stale = outcome.stale,
                            inactive = outcome.inactive,
                            unknown = outcome.unknown,
                            "Health sweep completed"
                        ),
                        Err(e) => error!(error = %e, "Health sweep failed"),
                    }
                }
                _ = shutdown_token.cancelled() => {
                    info!("Health sweep worker shutting down");
                    break;
                }
            }
        }
    });
}

/// Spawn the rate-limiter entry eviction sweep.
///
/// The limiter itself never evicts; without this sweep the entry map grows
/// with every distinct client key seen.
pub fn spawn_rate_limit_sweep_worker(
    state: Arc<RateLimiterState>,
    config: &Config,
    shutdown_token: CancellationToken,
) {
    let interval_seconds = config.server.rate_limit.sweep_interval_seconds;

    tokio::spawn(async move {
        info!(interval_seconds, "Rate-limit sweep worker started");

        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let evicted = state.limiter.sweep_expired(
                        crate::infrastructure::rate_limiter::unix_now(),
                    );
                    if evicted > 0 {
                        debug!(evicted, "Evicted expired rate-limit windows");
                    }
                }
                _ = shutdown_token.cancelled() => {
                    info!("Rate-limit sweep worker shutting down");
                    break;
                }
            }
        }
    });
}
