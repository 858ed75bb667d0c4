//! Streaming response decoder.
//!
//! Turns the assistant's line-delimited, optionally `data:`-prefixed JSON
//! stream into one reply string, reporting status envelopes through a
//! callback along the way.
//!
//! # Line handling
//!
//! | Line                                   | Effect                              |
//! |----------------------------------------|-------------------------------------|
//! | empty                                  | skipped                             |
//! | not JSON                               | appended verbatim                   |
//! | JSON but not an object                 | ignored (no fields)                 |
//! | `status: "error"`                      | decode fails with the message       |
//! | `status: "tool_result"`                | tool label sent to `on_status`      |
//! | `step`+`message`, or keyword `message` | message sent to `on_status`         |
//! | anything else                          | content token appended (deduped)    |
//!
//! Completion (`status: final|complete|completed`, `final`/`done` flags, or a
//! `message` containing `completed`) is checked after every envelope.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, info};

use crate::stream::classify::{classify, is_completion, LineKind};
use crate::stream::envelope::{Envelope, BUFFERED_FIELDS, FINAL_FIELDS};
use crate::stream::framing::Framer;
use crate::{AppError, Result};

/// Result of feeding one line to a [`ResponseDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Keep reading.
    Continue,
    /// The stream is logically finished with this reply.
    Finished(String),
}

/// Per-request decoder state.
#[derive(Debug, Default)]
pub struct ResponseDecoder {
    accumulated: String,
    status: Option<String>,
    lines: usize,
}

impl ResponseDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text accumulated so far.
    #[must_use]
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Most recent status text, cleared on completion or error.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Feed one raw protocol line.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Protocol` when the line is an error envelope.
    pub fn feed_line<F>(&mut self, raw_line: &str, on_status: &mut F) -> Result<LineOutcome>
    where
        F: FnMut(&str),
    {
        let line = raw_line.trim();
        if line.is_empty() {
            return Ok(LineOutcome::Continue);
        }
        self.lines += 1;

        let payload = line
            .strip_prefix("data:")
            .map_or(line, str::trim);

        let Some(env) = Envelope::parse(payload) else {
            debug!(line = self.lines, "plain text line appended");
            self.accumulated.push_str(payload);
            return Ok(LineOutcome::Continue);
        };

        match classify(&env) {
            LineKind::Error(message) => {
                self.status = None;
                return Err(AppError::Protocol(message));
            }
            LineKind::ToolStatus(text) | LineKind::Status(text) => {
                debug!(line = self.lines, status = text.as_str(), "status update");
                on_status(&text);
                self.status = Some(text);
            }
            LineKind::Content(Some(token)) => {
                if self.accumulated.contains(&token) {
                    debug!(line = self.lines, "skipping duplicate token");
                } else {
                    self.accumulated.push_str(&token);
                }
            }
            LineKind::Content(None) => {}
        }

        if !is_completion(&env) {
            return Ok(LineOutcome::Continue);
        }

        // A structured preferred value (e.g. an object `data`) shadows the
        // later string fields and never replaces the reply.
        let preferred = env.first_present(FINAL_FIELDS).and_then(Value::as_str);
        match preferred {
            Some(preferred) if preferred != self.accumulated => {
                self.status = None;
                Ok(LineOutcome::Finished(preferred.to_owned()))
            }
            _ if self.accumulated.is_empty() => {
                debug!(line = self.lines, "completion without content, continuing");
                Ok(LineOutcome::Continue)
            }
            _ => {
                self.status = None;
                Ok(LineOutcome::Finished(self.accumulated.clone()))
            }
        }
    }

    /// Consume the decoder, returning whatever was accumulated.
    #[must_use]
    pub fn finish(self) -> String {
        self.accumulated
    }
}

/// Decode a streamed body into a single reply.
///
/// Returns as soon as a completion envelope settles the reply; otherwise
/// returns the accumulated text when the body ends.
///
/// # Errors
///
/// Returns `AppError::Transport` when the body stream fails and
/// `AppError::Protocol` on an in-band error envelope.
pub async fn decode_stream<S, F>(body: S, mut framer: Framer, mut on_status: F) -> Result<String>
where
    S: Stream<Item = Result<Bytes>>,
    F: FnMut(&str),
{
    let mut body = std::pin::pin!(body);
    let mut decoder = ResponseDecoder::new();
    let mut chunks = 0usize;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        chunks += 1;
        for line in framer.push(&chunk)? {
            if let LineOutcome::Finished(reply) = decoder.feed_line(&line, &mut on_status)? {
                info!(chunks, len = reply.len(), "stream finished by completion envelope");
                return Ok(reply);
            }
        }
    }

    for line in framer.finish()? {
        if let LineOutcome::Finished(reply) = decoder.feed_line(&line, &mut on_status)? {
            info!(chunks, len = reply.len(), "stream finished by completion envelope");
            return Ok(reply);
        }
    }

    info!(chunks, "stream ended without completion envelope");
    Ok(decoder.finish())
}

/// Decode a fully buffered body.
///
/// A JSON object yields its first non-empty reply field, falling back to the
/// pretty-printed document. Other JSON values are pretty-printed; non-JSON
/// text is returned unchanged.
#[must_use]
pub fn decode_buffered(text: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return text.to_owned();
    };

    if let Value::Object(map) = &value {
        let env = Envelope::from_map(map.clone());
        if let Some(reply) = env.first_string(BUFFERED_FIELDS) {
            return reply.to_owned();
        }
    }

    serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_owned())
}
