//! Suggestion synthesis
//!
//! Turns a manifest-touching commit into a pending, unapplied
//! [`CommitSuggestion`]. A tag-less manifest touch is not a signal and
//! produces nothing.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::CommitSuggestion;
use crate::domain::push::Commit;
use crate::domain::value_objects::ManifestPatch;

use super::tag_parser::CommitTags;

/// Build a pending suggestion for one `(commit, microservice)` pair.
///
/// The patch carries only what the commit asserts: status and next steps
/// from the tags, plus an implied `last_update` from the commit timestamp.
/// Returns `None` when the message carried no recognized tags.
pub fn synthesize_suggestion(
    microservice_id: Uuid,
    commit: &Commit,
    tags: &CommitTags,
) -> Option<CommitSuggestion> {
    if tags.is_empty() {
        return None;
    }

    let suggested_manifest = ManifestPatch {
        status: tags.status.clone(),
        next_steps: if tags.next_steps.is_empty() {
            None
        } else {
            Some(tags.next_steps.clone())
        },
        last_update: Some(commit.timestamp),
    };

    Some(CommitSuggestion {
        id: Uuid::new_v4(),
        microservice_id,
        commit_sha: commit.id.clone(),
        commit_message: commit.message.clone(),
        parsed_status: tags.status.clone(),
        parsed_next_steps: tags.next_steps.clone(),
        suggested_manifest,
        is_applied: false,
        created_at: Utc::now(),
    })
}
