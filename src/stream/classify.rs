//! Envelope classification.
//!
//! Deciding whether an envelope is a status update or content is heuristic:
//! the backend does not tag its events consistently. The heuristics live in
//! the static tables below so they can be inspected and extended on their
//! own.

use serde_json::Value;

use crate::stream::envelope::{Envelope, CONTENT_FIELDS};

/// Substrings that mark a bare `message` as a status update.
pub const STATUS_KEYWORDS: &[&str] = &[
    "Starting",
    "Processing",
    "agent:",
    "Connecting",
    "Searching",
    "Accessing",
    "Querying",
    "WolframAlpha",
    "tool_result",
    "calling",
];

/// `{substring → label}` table for `tool_result` envelopes, checked in order
/// against the tool id and the tool result.
pub const TOOL_STATUS_LABELS: &[(&str, &str)] = &[
    ("wolfram", "Computing solution with WolframAlpha..."),
    ("search", "Searching knowledge base..."),
    ("elastic", "Querying Elasticsearch database..."),
];

/// `status` values that signal the end of a stream.
pub const COMPLETION_STATUSES: &[&str] = &["final", "complete", "completed"];

/// Message used when an error envelope carries neither `message` nor `error`.
pub const FALLBACK_ERROR_MESSAGE: &str = "Backend error occurred";

/// How a single envelope contributes to the decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// In-band error; the decode fails with this message.
    Error(String),
    /// Status label derived from a `tool_result` envelope.
    ToolStatus(String),
    /// Generic status text.
    Status(String),
    /// Content token, if the envelope carried a usable string.
    Content(Option<String>),
}

/// Classify an envelope. Completion is checked separately with
/// [`is_completion`] because it applies on top of every kind.
#[must_use]
pub fn classify(env: &Envelope) -> LineKind {
    match env.status() {
        Some("error") => return LineKind::Error(error_message(env)),
        Some("tool_result") => {
            let tool_id = tool_name(env);
            let result = env.get("result").map(value_text).unwrap_or_default();
            return LineKind::ToolStatus(tool_status_label(&tool_id, &result));
        }
        _ => {}
    }

    if let Some(message) = status_message(env) {
        return LineKind::Status(message.to_owned());
    }

    let token = env
        .first_present(CONTENT_FIELDS)
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_owned);
    LineKind::Content(token)
}

/// Derive the status label for a tool invocation result.
#[must_use]
pub fn tool_status_label(tool_id: &str, result: &str) -> String {
    TOOL_STATUS_LABELS
        .iter()
        .find(|(needle, _)| tool_id.contains(needle) || result.contains(needle))
        .map_or_else(
            || format!("Processing with {tool_id}..."),
            |(_, label)| (*label).to_owned(),
        )
}

/// Whether a message reads like a progress update.
#[must_use]
pub fn has_status_keyword(message: &str) -> bool {
    STATUS_KEYWORDS.iter().any(|kw| message.contains(kw))
}

/// The status text of an envelope, when it is a generic status update.
///
/// Either `step` and `message` are set with no `data`, or `message` is set
/// with no `data` and contains one of [`STATUS_KEYWORDS`].
#[must_use]
pub fn status_message(env: &Envelope) -> Option<&str> {
    let message = env.message().filter(|m| !m.is_empty())?;
    if !env.is_blank("data") {
        return None;
    }
    if !env.is_blank("step") || has_status_keyword(message) {
        Some(message)
    } else {
        None
    }
}

/// Whether an envelope marks the logical end of the stream.
#[must_use]
pub fn is_completion(env: &Envelope) -> bool {
    env.status()
        .is_some_and(|status| COMPLETION_STATUSES.contains(&status))
        || env.flag("final")
        || env.flag("done")
        || env.message().is_some_and(|m| m.contains("completed"))
}

/// Build the failure message for an error envelope.
#[must_use]
pub fn error_message(env: &Envelope) -> String {
    let message = env.message().filter(|m| !m.is_empty());
    let detail = env.error().filter(|e| !e.is_empty());
    match (message, detail) {
        (Some(message), Some(detail)) => format!("{message}: {detail}"),
        (Some(message), None) => message.to_owned(),
        (None, Some(detail)) => detail.to_owned(),
        (None, None) => FALLBACK_ERROR_MESSAGE.to_owned(),
    }
}

fn tool_name(env: &Envelope) -> String {
    ["tool_id", "tool"]
        .iter()
        .filter_map(|field| env.str_field(field))
        .find(|name| !name.is_empty())
        .unwrap_or("tool")
        .to_owned()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
