//! Plan-based quota gate
//!
//! Longer-lived resource ceilings, as opposed to the per-window rate
//! limiter. Pure over `(usage snapshot, plan)` so it is testable without a
//! live store; callers fetch the snapshot and consult this before any
//! resource-creating operation.

use crate::domain::value_objects::{Plan, QuotaDecision, QuotaResource, UsageSnapshot};

/// Decide whether creating one more of `resource` fits the plan.
///
/// A `-1` ceiling means unlimited.
pub fn check_quota(usage: &UsageSnapshot, plan: Plan, resource: QuotaResource) -> QuotaDecision {
    let limit = plan.limits().for_resource(resource);
    let current = usage.for_resource(resource);
    let allowed = limit < 0 || current < limit;
    QuotaDecision {
        allowed,
        current,
        limit,
    }
}
