//! Progress-stream decoders for session creation and free-response grading.
//!
//! These streams are strict SSE-style: only lines starting with `data: ` are
//! considered, and every parsed envelope is handed to the progress callback
//! unchanged. The two flows differ only in what ends them, expressed through
//! the [`Completion`] trait.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::stream::classify::error_message;
use crate::stream::envelope::Envelope;
use crate::stream::framing::Framer;
use crate::{AppError, Result};

/// Prefix a progress line must carry to be considered.
pub const DATA_PREFIX: &str = "data: ";

/// Completion predicate for a progress stream.
pub trait Completion {
    /// Value produced when the stream completes.
    type Output;

    /// Inspect an envelope and return the output when it ends the stream.
    fn complete(&self, env: &Envelope) -> Option<Self::Output>;
}

/// Session creation ends with `status: "final"` carrying a `session_id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCreated;

impl Completion for SessionCreated {
    type Output = String;

    fn complete(&self, env: &Envelope) -> Option<String> {
        if env.status() != Some("final") {
            return None;
        }
        env.session_id()
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
    }
}

/// Grading ends with `status: "final"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradingFinished;

impl Completion for GradingFinished {
    type Output = ();

    fn complete(&self, env: &Envelope) -> Option<()> {
        (env.status() == Some("final")).then_some(())
    }
}

/// Parse one progress line.
///
/// Returns `None` for lines without the [`DATA_PREFIX`] and for payloads
/// that are not JSON objects.
#[must_use]
pub fn parse_progress_line(line: &str) -> Option<Envelope> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let env = Envelope::parse_object(payload);
    if env.is_none() {
        debug!("progress line is not a JSON object, skipping");
    }
    env
}

/// Feed one line through `completion`, forwarding the envelope to
/// `on_progress`.
///
/// # Errors
///
/// Returns `AppError::Protocol` when the line is an error envelope.
pub fn feed_progress_line<C, F>(
    completion: &C,
    line: &str,
    on_progress: &mut F,
) -> Result<Option<C::Output>>
where
    C: Completion,
    F: FnMut(&Envelope),
{
    let Some(env) = parse_progress_line(line) else {
        return Ok(None);
    };

    on_progress(&env);

    if env.status() == Some("error") {
        return Err(AppError::Protocol(error_message(&env)));
    }

    Ok(completion.complete(&env))
}

/// Drive a progress stream until `completion` fires or the body ends.
///
/// Returns `Ok(None)` when the body ends without a completion envelope.
///
/// # Errors
///
/// Returns `AppError::Transport` when the body stream fails and
/// `AppError::Protocol` on an in-band error envelope.
pub async fn drive<S, C, F>(
    body: S,
    mut framer: Framer,
    completion: C,
    mut on_progress: F,
) -> Result<Option<C::Output>>
where
    S: Stream<Item = Result<Bytes>>,
    C: Completion,
    F: FnMut(&Envelope),
{
    let mut body = std::pin::pin!(body);

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        for line in framer.push(&chunk)? {
            if let Some(output) = feed_progress_line(&completion, &line, &mut on_progress)? {
                return Ok(Some(output));
            }
        }
    }

    for line in framer.finish()? {
        if let Some(output) = feed_progress_line(&completion, &line, &mut on_progress)? {
            return Ok(Some(output));
        }
    }

    Ok(None)
}

/// Wait for the session identifier announced by a session-creation stream.
///
/// When the body ends without a final envelope the returned future stays
/// pending; bound it with `tokio::time::timeout` if that matters.
///
/// # Errors
///
/// Returns `AppError::Transport` when the body stream fails and
/// `AppError::Protocol` on an in-band error envelope.
pub async fn await_session_id<S, F>(body: S, framer: Framer, on_progress: F) -> Result<String>
where
    S: Stream<Item = Result<Bytes>>,
    F: FnMut(&Envelope),
{
    if let Some(session_id) = drive(body, framer, SessionCreated, on_progress).await? {
        info!(session_id = session_id.as_str(), "session created");
        return Ok(session_id);
    }

    warn!("session stream ended without a session id, waiting indefinitely");
    std::future::pending().await
}

/// Wait for a grading stream to finish.
///
/// Resolves on the final envelope or when the body ends.
///
/// # Errors
///
/// Returns `AppError::Transport` when the body stream fails and
/// `AppError::Protocol` on an in-band error envelope.
pub async fn await_grading<S, F>(body: S, framer: Framer, on_progress: F) -> Result<()>
where
    S: Stream<Item = Result<Bytes>>,
    F: FnMut(&Envelope),
{
    match drive(body, framer, GradingFinished, on_progress).await? {
        Some(()) => info!("grading finished"),
        None => info!("grading stream ended without final envelope"),
    }
    Ok(())
}
