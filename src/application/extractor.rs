//! Manifest change extraction
//!
//! Scans a push's commit list for files matching the manifest filename
//! convention. A push touching no manifests is the common case and must
//! stay cheap: no allocation beyond the empty result.

use crate::domain::push::{Commit, ManifestChangeEvent};

/// Whether a path's basename equals the configured manifest filename.
///
/// Exact basename equality only; no glob or regex, no content sniffing.
pub fn is_manifest_path(path: &str, manifest_filename: &str) -> bool {
    let basename = path.rsplit('/').next().unwrap_or(path);
    basename == manifest_filename
}

/// Collect the commits that touched a manifest file, paired with the
/// matching paths, preserving the provider's commit order (earliest first).
pub fn extract_manifest_changes(
    commits: &[Commit],
    manifest_filename: &str,
) -> Vec<ManifestChangeEvent> {
    let mut events = Vec::new();
    for commit in commits {
        let matching_paths: Vec<String> = commit
            .touched_paths()
            .filter(|path| is_manifest_path(path, manifest_filename))
            .map(str::to_string)
            .collect();

        if !matching_paths.is_empty() {
            events.push(ManifestChangeEvent {
                commit: commit.clone(),
                matching_paths,
            });
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::push::CommitAuthor;
    use chrono::Utc;

    fn commit(id: &str, added: &[&str], modified: &[&str], removed: &[&str]) -> Commit {
        Commit {
            id: id.to_string(),
            message: String::new(),
            timestamp: Utc::now(),
            author: CommitAuthor {
                name: "dev".into(),
                email: None,
            },
            added: added.iter().map(|s| s.to_string()).collect(),
            modified: modified.iter().map(|s| s.to_string()).collect(),
            removed: removed.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn matches_exact_basename_only() {
        assert!(is_manifest_path("vibe.json", "vibe.json"));
        assert!(is_manifest_path("services/api/vibe.json", "vibe.json"));
        assert!(!is_manifest_path("services/api/vibe.json.bak", "vibe.json"));
        assert!(!is_manifest_path("services/api/my-vibe.json", "vibe.json"));
        assert!(!is_manifest_path("vibe.jsonx", "vibe.json"));
    }

    #[test]
    fn no_matches_yields_empty_result() {
        let commits = vec![commit("a", &["README.md"], &["src/main.rs"], &[])];
        assert!(extract_manifest_changes(&commits, "vibe.json").is_empty());
    }

    #[test]
    fn preserves_commit_order() {
        let commits = vec![
            commit("first", &[], &["a/vibe.json"], &[]),
            commit("skipped", &["docs/notes.md"], &[], &[]),
            commit("second", &[], &[], &["b/vibe.json"]),
        ];
        let events = extract_manifest_changes(&commits, "vibe.json");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].commit.id, "first");
        assert_eq!(events[1].commit.id, "second");
    }

    #[test]
    fn collects_all_matching_paths_in_a_commit() {
        let commits = vec![commit(
            "multi",
            &["a/vibe.json"],
            &["b/vibe.json", "b/src/lib.rs"],
            &[],
        )];
        let events = extract_manifest_changes(&commits, "vibe.json");
        assert_eq!(events[0].matching_paths, vec!["a/vibe.json", "b/vibe.json"]);
    }

    #[test]
    fn removed_manifests_still_count_as_changes() {
        let commits = vec![commit("rm", &[], &[], &["old/vibe.json"])];
        let events = extract_manifest_changes(&commits, "vibe.json");
        assert_eq!(events.len(), 1);
    }
}
