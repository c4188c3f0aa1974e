//! Commit-message tag grammar
//!
//! Commits carry structured annotations in free text:
//! `[STATUS:<value>]` sets the service status, `[NEXT:<value>]` appends a
//! next step. Keywords are case-insensitive, values run to the closing
//! bracket, repeated NEXT tags accumulate in order of appearance, and any
//! other bracketed text (issue references etc.) is ignored.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[(STATUS|NEXT):([^\]]*)\]").expect("tag pattern is valid"));

/// Tags extracted from a single commit message. Most commits carry none;
/// that is not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitTags {
    pub status: Option<String>,
    pub next_steps: Vec<String>,
}

impl CommitTags {
    /// Whether the message carried no recognized tags at all.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.next_steps.is_empty()
    }
}

/// Extract status and next-step tags from a commit message.
pub fn parse_commit_tags(message: &str) -> CommitTags {
    let mut tags = CommitTags::default();
    for capture in TAG_PATTERN.captures_iter(message) {
        let keyword = &capture[1];
        let value = capture[2].trim();
        if value.is_empty() {
            continue;
        }
        if keyword.eq_ignore_ascii_case("STATUS") {
            // Last STATUS tag wins, matching apply-in-order semantics.
            tags.status = Some(value.to_string());
        } else {
            tags.next_steps.push(value.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_message_yields_empty_tags() {
        let tags = parse_commit_tags("fix flaky retry logic");
        assert!(tags.is_empty());
        assert_eq!(tags.status, None);
        assert!(tags.next_steps.is_empty());
    }

    #[test]
    fn extracts_status_and_next() {
        let tags = parse_commit_tags("fix bug [STATUS:Done] [NEXT:Deploy]");
        assert_eq!(tags.status.as_deref(), Some("Done"));
        assert_eq!(tags.next_steps, vec!["Deploy"]);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let tags = parse_commit_tags("[status:In Progress] [Next:review PR]");
        assert_eq!(tags.status.as_deref(), Some("In Progress"));
        assert_eq!(tags.next_steps, vec!["review PR"]);
    }

    #[test]
    fn repeated_next_tags_accumulate_in_order() {
        let tags = parse_commit_tags("[NEXT:a] refactor [NEXT:b] then [NEXT:c]");
        assert_eq!(tags.next_steps, vec!["a", "b", "c"]);
    }

    #[test]
    fn unrelated_bracketed_text_is_ignored() {
        let tags = parse_commit_tags("[JIRA-123] hotfix [STATUS:Blocked] see [rfc 9110]");
        assert_eq!(tags.status.as_deref(), Some("Blocked"));
        assert!(tags.next_steps.is_empty());
    }

    #[test]
    fn values_are_trimmed() {
        let tags = parse_commit_tags("[STATUS:  Done  ][NEXT:  ship it ]");
        assert_eq!(tags.status.as_deref(), Some("Done"));
        assert_eq!(tags.next_steps, vec!["ship it"]);
    }

    #[test]
    fn empty_values_are_dropped() {
        let tags = parse_commit_tags("[STATUS:] [NEXT:  ]");
        assert!(tags.is_empty());
    }

    #[test]
    fn tags_anywhere_in_multiline_messages() {
        let tags = parse_commit_tags("feat: rework ingest\n\nlong body text\n[NEXT:load test]");
        assert_eq!(tags.next_steps, vec!["load test"]);
    }
}
