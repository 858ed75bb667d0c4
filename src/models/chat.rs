//! Local chat transcript kept by the interactive chat loop.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppError, Result};

/// Who sent a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The student.
    User,
    /// The assistant.
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: String,
    /// Message text.
    pub content: String,
    /// Sender.
    pub sender: Sender,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Construct a message stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered chat history for one practice session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTranscript {
    /// Transcript identifier.
    pub id: String,
    /// Practice session the chat belongs to, if any.
    pub practice_session_id: Option<String>,
    /// Messages in order.
    pub messages: Vec<ChatMessage>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ChatTranscript {
    /// Start an empty transcript.
    #[must_use]
    pub fn new(practice_session_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            practice_session_id,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`.
    pub fn push(&mut self, sender: Sender, content: impl Into<String>) -> &ChatMessage {
        let message = ChatMessage::new(sender, content);
        self.updated_at = message.timestamp;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Load a transcript saved with [`ChatTranscript::save`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read and
    /// `AppError::Decode` if it is not a transcript.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write the transcript as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Decode(format!("failed to encode transcript: {err}")))?;
        fs::write(path, raw)?;
        Ok(())
    }
}
