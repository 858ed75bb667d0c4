//! Line framing for streamed response bodies.
//!
//! Two strategies are supported:
//!
//! - [`Framing::Chunk`] (default): every body chunk is decoded as UTF-8 on
//!   its own and split on `\n`. A line that straddles two chunks is seen as
//!   two broken lines. The backend flushes one envelope per write, so in
//!   practice every envelope arrives whole.
//! - [`Framing::Lines`]: chunks are buffered and cut at newlines by
//!   [`LineCodec`], so envelopes split across chunks are reassembled.

use bytes::{Buf, BytesMut};
use serde::Deserialize;
use tokio_util::codec::Decoder;
use tracing::warn;

use crate::{AppError, Result};

/// Default maximum line length accepted by [`LineCodec`]: 1 MiB.
pub const MAX_LINE_BYTES: usize = 1_048_576;

/// How a streamed body is cut into protocol lines.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// Split each received chunk independently.
    #[default]
    Chunk,
    /// Reassemble lines across chunk boundaries.
    Lines,
}

/// Split a single body chunk into lines.
///
/// Invalid UTF-8 sequences are replaced with `U+FFFD`. A chunk without a
/// trailing newline still yields its last line.
#[must_use]
pub fn split_chunk(chunk: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(chunk)
        .split('\n')
        .map(str::to_owned)
        .collect()
}

/// Newline codec with a bounded line length.
///
/// Lines are decoded as lossy UTF-8, like [`split_chunk`], so a bad byte
/// sequence never fails the stream. Lines longer than the limit are
/// discarded up to the next newline and reported as [`AppError::Framing`]
/// instead of being buffered.
#[derive(Debug)]
pub struct LineCodec {
    max_length: usize,
    /// Bytes already searched for a newline.
    next_index: usize,
    /// Inside an over-long line that is being dropped.
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default [`MAX_LINE_BYTES`] limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_BYTES)
    }

    /// Create a codec with a custom line limit.
    #[must_use]
    pub fn with_max_length(max_line_bytes: usize) -> Self {
        Self {
            max_length: max_line_bytes,
            next_index: 0,
            discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = AppError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            let read_to = src.len().min(self.max_length.saturating_add(1));
            let newline = src[self.next_index..read_to]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| offset + self.next_index);

            match (self.discarding, newline) {
                (true, Some(index)) => {
                    src.advance(index + 1);
                    self.discarding = false;
                    self.next_index = 0;
                }
                (true, None) => {
                    src.advance(read_to);
                    self.next_index = 0;
                    if src.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(index)) => {
                    self.next_index = 0;
                    let line = src.split_to(index + 1);
                    return Ok(Some(lossy_line(&line[..index])));
                }
                (false, None) if src.len() > self.max_length => {
                    self.discarding = true;
                    return Err(AppError::Framing(
                        "line too long: exceeded max line length".into(),
                    ));
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() || src[..] == b"\r"[..] {
            src.clear();
            return Ok(None);
        }
        self.next_index = 0;
        let line = src.split_to(src.len());
        Ok(Some(lossy_line(&line)))
    }
}

fn lossy_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Stateful line splitter driven one body chunk at a time.
#[derive(Debug)]
pub enum Framer {
    /// Per-chunk splitting; holds no state.
    Chunk,
    /// Buffered splitting across chunk boundaries.
    Lines {
        /// Line codec with the configured limit.
        codec: LineCodec,
        /// Bytes received but not yet terminated by a newline.
        buf: BytesMut,
    },
}

impl Framer {
    /// Build a framer for the given strategy.
    #[must_use]
    pub fn new(framing: Framing, max_line_bytes: usize) -> Self {
        match framing {
            Framing::Chunk => Self::Chunk,
            Framing::Lines => Self::Lines {
                codec: LineCodec::with_max_length(max_line_bytes),
                buf: BytesMut::new(),
            },
        }
    }

    /// Feed one chunk and return the lines it completes.
    ///
    /// Over-long lines are logged and skipped.
    ///
    /// # Errors
    ///
    /// Over-long lines are not errors. Any other codec failure is returned.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>> {
        match self {
            Self::Chunk => Ok(split_chunk(chunk)),
            Self::Lines { codec, buf } => {
                buf.extend_from_slice(chunk);
                drain(codec, buf, false)
            }
        }
    }

    /// Flush any unterminated trailing line once the body ends.
    ///
    /// # Errors
    ///
    /// Over-long lines are not errors. Any other codec failure is returned.
    pub fn finish(&mut self) -> Result<Vec<String>> {
        match self {
            Self::Chunk => Ok(Vec::new()),
            Self::Lines { codec, buf } => drain(codec, buf, true),
        }
    }
}

fn drain(codec: &mut LineCodec, buf: &mut BytesMut, eof: bool) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        let next = if eof {
            codec.decode_eof(buf)
        } else {
            codec.decode(buf)
        };
        match next {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => break,
            Err(AppError::Framing(msg)) => {
                warn!(error = msg.as_str(), "framing error, skipping line");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(lines)
}
