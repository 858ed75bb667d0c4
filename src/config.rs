//! Client configuration parsing and validation.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::stream::framing::{Framing, MAX_LINE_BYTES};
use crate::{AppError, Result};

/// Environment variable that overrides [`ClientConfig::base_url`].
pub const BASE_URL_ENV: &str = "QUIZ_BACKEND_URL";

/// Streamed-body handling settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StreamConfig {
    /// How body chunks are cut into protocol lines.
    #[serde(default)]
    pub framing: Framing,
    /// Maximum line length when `framing = "lines"`.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            framing: Framing::default(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

fn default_max_line_bytes() -> usize {
    MAX_LINE_BYTES
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}

fn default_session_timeout() -> u64 {
    600
}

/// Client configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User id sent with assistant and session-creation requests.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Streamed-body handling.
    #[serde(default)]
    pub stream: StreamConfig,
    /// Upper bound the CLI puts on session creation; 0 means no bound.
    #[serde(default = "default_session_timeout")]
    pub session_timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: None,
            headers: HashMap::new(),
            stream: StreamConfig::default(),
            session_timeout_seconds: default_session_timeout(),
        }
    }
}

impl ClientConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the [`BASE_URL_ENV`] override when set and non-empty.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the overridden URL fails validation.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                debug!(url = url.as_str(), "base url overridden from environment");
                self.base_url = url;
            }
        }
        self.validate()
    }

    /// Replace the base URL and revalidate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the URL is not an `http(s)` URL.
    pub fn set_base_url(&mut self, url: impl Into<String>) -> Result<()> {
        self.base_url = url.into();
        self.validate()
    }

    fn validate(&mut self) -> Result<()> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        self.base_url = trimmed.to_owned();

        if self.stream.max_line_bytes == 0 {
            return Err(AppError::Config(
                "stream.max_line_bytes must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
