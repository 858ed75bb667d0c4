//! Error types shared across the client.

use std::fmt::{Display, Formatter};

/// Shared client result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Client error enumeration covering all failure modes.
///
/// Transport-level failures (`Transport`, `Http`) and in-band protocol
/// failures (`Protocol`) travel through the same channel but stay
/// distinguishable for callers that present them differently.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Network failure before or while reading a response body.
    Transport(String),
    /// Backend answered with a non-2xx status.
    Http {
        /// Numeric HTTP status code.
        status: u16,
        /// Response body text, `detail` field, or status line.
        message: String,
    },
    /// In-band `status: "error"` envelope inside a 2xx stream.
    Protocol(String),
    /// Response body could not be deserialized into the expected model.
    Decode(String),
    /// Line framing failure (line exceeded the configured limit).
    Framing(String),
    /// File-system or terminal I/O failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Http { message, .. } => write!(f, "{message}"),
            Self::Protocol(msg) => write!(f, "{msg}"),
            Self::Decode(msg) => write!(f, "decode: {msg}"),
            Self::Framing(msg) => write!(f, "framing: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
