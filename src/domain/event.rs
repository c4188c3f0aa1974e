//! Webhook event classification

/// Kind of webhook delivery, derived from the provider's event-type header.
///
/// Unrecognized headers map to [`WebhookEvent::Unknown`]; classification
/// never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEvent {
    Push,
    Ping,
    Unknown,
}

impl WebhookEvent {
    /// Classify the `X-GitHub-Event` header value.
    pub fn from_header(value: &str) -> Self {
        match value {
            "push" => WebhookEvent::Push,
            "ping" => WebhookEvent::Ping,
            _ => WebhookEvent::Unknown,
        }
    }

    /// Event name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::Push => "push",
            WebhookEvent::Ping => "ping",
            WebhookEvent::Unknown => "unknown",
        }
    }
}

/// Whether a push reference targets the repository's primary branch.
///
/// Strips the `refs/heads/` prefix and compares case-sensitively against
/// `main` or `master`. Pushes to any other branch are acknowledged but
/// drive no suggestion synthesis.
pub fn is_default_branch(ref_name: &str) -> bool {
    let branch = ref_name.strip_prefix("refs/heads/").unwrap_or(ref_name);
    branch == "main" || branch == "master"
}
