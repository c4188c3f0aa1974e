//! Commit-recency health classification
//!
//! Health is always re-derivable from `(now, last_commit_date)` alone. The
//! classifier holds no state and never schedules itself; the periodic sweep
//! lives in `workers` and merely calls [`HealthSweepService::run_sweep`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::repositories::{
    IMicroserviceRepository, ITrackedRepositoryRepository, StoreError,
};
use crate::domain::value_objects::HealthStatus;
use crate::infrastructure::source_control::SourceControlClient;

/// Age thresholds in whole calendar days.
const HEALTHY_MAX_AGE_DAYS: i64 = 7;
const STALE_MAX_AGE_DAYS: i64 = 30;

/// Classify a service's health from its last commit date.
///
/// Ages are whole calendar days (date truncation, not 24-hour spans), so a
/// commit late yesterday is one day old regardless of the hour.
pub fn classify_health(now: DateTime<Utc>, last_commit_date: Option<DateTime<Utc>>) -> HealthStatus {
    let Some(last_commit) = last_commit_date else {
        return HealthStatus::Unknown;
    };

    let age_days = now
        .date_naive()
        .signed_duration_since(last_commit.date_naive())
        .num_days();

    if age_days <= HEALTHY_MAX_AGE_DAYS {
        HealthStatus::Healthy
    } else if age_days <= STALE_MAX_AGE_DAYS {
        HealthStatus::Stale
    } else {
        HealthStatus::Inactive
    }
}

/// Counts per health state produced by a sweep.
#[derive(Debug, Default, Clone, Copy, serde::Serialize, utoipa::ToSchema)]
pub struct SweepOutcome {
    pub swept: usize,
    pub healthy: usize,
    pub stale: usize,
    pub inactive: usize,
    pub unknown: usize,
}

impl SweepOutcome {
    fn record(&mut self, status: HealthStatus) {
        self.swept += 1;
        match status {
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Stale => self.stale += 1,
            HealthStatus::Inactive => self.inactive += 1,
            HealthStatus::Unknown => self.unknown += 1,
        }
    }
}

/// Recomputes and persists health for tracked services.
pub struct HealthSweepService {
    microservice_repository: Arc<dyn IMicroserviceRepository>,
    tracked_repository_repository: Arc<dyn ITrackedRepositoryRepository>,
    /// Used to backfill `last_commit_date` for services that have never seen
    /// a push. Best effort: provider failures leave the service Unknown.
    source_control: Option<Arc<dyn SourceControlClient>>,
}

impl HealthSweepService {
    pub fn new(
        microservice_repository: Arc<dyn IMicroserviceRepository>,
        tracked_repository_repository: Arc<dyn ITrackedRepositoryRepository>,
        source_control: Option<Arc<dyn SourceControlClient>>,
    ) -> Self {
        Self {
            microservice_repository,
            tracked_repository_repository,
            source_control,
        }
    }

    /// Recompute health for every tracked service.
    pub async fn run_sweep(&self) -> Result<SweepOutcome, StoreError> {
        let services = self.microservice_repository.list_all().await?;
        let now = Utc::now();
        let mut outcome = SweepOutcome::default();

        for service in services {
            let last_commit_date = match service.last_commit_date {
                Some(date) => Some(date),
                None => self.backfill_last_commit(&service).await,
            };

            let status = classify_health(now, last_commit_date);
            self.microservice_repository
                .update_health(service.id, status, last_commit_date)
                .await?;
            debug!(
                microservice_id = %service.id,
                status = %status,
                "Health recomputed"
            );
            outcome.record(status);
        }

        Ok(outcome)
    }

    /// Recompute health for a single service on demand and persist it.
    pub async fn classify_service(&self, id: Uuid) -> Result<HealthStatus, StoreError> {
        let service = self
            .microservice_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("microservice {}", id)))?;

        let status = classify_health(Utc::now(), service.last_commit_date);
        self.microservice_repository
            .update_health(service.id, status, service.last_commit_date)
            .await?;
        Ok(status)
    }

    async fn backfill_last_commit(
        &self,
        service: &crate::domain::entities::Microservice,
    ) -> Option<DateTime<Utc>> {
        let source_control = self.source_control.as_ref()?;
        let repository = match self
            .tracked_repository_repository
            .find_by_id(service.repository_id)
            .await
        {
            Ok(Some(repository)) => repository,
            Ok(None) => return None,
            Err(e) => {
                warn!(
                    microservice_id = %service.id,
                    error = %e,
                    "Failed to load repository during health backfill"
                );
                return None;
            }
        };

        match source_control
            .latest_commit(&repository.full_name, &service.manifest_path)
            .await
        {
            Ok(Some(commit)) => Some(commit.timestamp),
            Ok(None) => None,
            Err(e) => {
                warn!(
                    microservice_id = %service.id,
                    error = %e,
                    "Provider lookup failed during health backfill"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn missing_date_is_unknown() {
        assert_eq!(classify_health(Utc::now(), None), HealthStatus::Unknown);
    }

    #[test]
    fn boundary_table() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let cases = [
            (0, HealthStatus::Healthy),
            (3, HealthStatus::Healthy),
            (7, HealthStatus::Healthy),
            (8, HealthStatus::Stale),
            (10, HealthStatus::Stale),
            (30, HealthStatus::Stale),
            (31, HealthStatus::Inactive),
            (45, HealthStatus::Inactive),
            (400, HealthStatus::Inactive),
        ];
        for (days, expected) in cases {
            let last = now - Duration::days(days);
            assert_eq!(
                classify_health(now, Some(last)),
                expected,
                "age {} days",
                days
            );
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let last = Some(now - Duration::days(12));
        assert_eq!(classify_health(now, last), classify_health(now, last));
    }

    #[test]
    fn uses_calendar_days_not_hour_spans() {
        // 23:30 yesterday vs 00:30 today is one calendar day even though
        // only an hour elapsed.
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 30, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2024, 6, 14, 23, 30, 0).unwrap();
        assert_eq!(classify_health(now, Some(last)), HealthStatus::Healthy);

        // 8 calendar days back at a late hour is still Stale.
        let last = Utc.with_ymd_and_hms(2024, 6, 7, 23, 59, 0).unwrap();
        assert_eq!(classify_health(now, Some(last)), HealthStatus::Stale);
    }

    #[test]
    fn future_commit_dates_stay_healthy() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let last = now + Duration::days(1);
        assert_eq!(classify_health(now, Some(last)), HealthStatus::Healthy);
    }
}
