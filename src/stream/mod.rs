//! Streamed response handling.
//!
//! The backend answers long-running calls with newline-delimited JSON
//! envelopes over a chunked HTTP body (SSE-like, without `event:`/`id:`
//! fields or reconnection).
//!
//! - `envelope`: loosely typed envelope record with ordered field lookup.
//! - `classify`: keyword tables and envelope classification.
//! - `framing`: cutting body chunks into protocol lines.
//! - `decoder`: assistant reply decoding, streamed and buffered.
//! - `progress`: session-creation and grading progress streams.

pub mod classify;
pub mod decoder;
pub mod envelope;
pub mod framing;
pub mod progress;

pub use decoder::{decode_buffered, decode_stream, LineOutcome, ResponseDecoder};
pub use envelope::Envelope;
pub use framing::{Framer, Framing};
