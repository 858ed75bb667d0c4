//! Assistant chat request and conversation models.

use serde::{Deserialize, Serialize};

/// Body of `POST /assistant`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistantRequest {
    /// The student's question.
    pub user_question: String,
    /// Asking user; empty when anonymous.
    pub user_id: String,
    /// Question the student is looking at, for context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    /// Practice session the student is in, for context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AssistantRequest {
    /// Build a request with no question or session context.
    #[must_use]
    pub fn new(user_question: impl Into<String>, user_id: Option<&str>) -> Self {
        Self {
            user_question: user_question.into(),
            user_id: user_id.unwrap_or_default().to_owned(),
            question_id: None,
            session_id: None,
        }
    }

    /// Attach the question being discussed.
    #[must_use]
    pub fn with_question(mut self, question_id: impl Into<String>) -> Self {
        self.question_id = Some(question_id.into());
        self
    }

    /// Attach the practice session being discussed.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Speaker of a stored conversation message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The student.
    User,
    /// The assistant.
    Assistant,
}

/// One stored conversation message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationMessage {
    /// Speaker.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Timestamp as sent by the backend.
    pub timestamp: String,
}

/// Result of `GET /assistant/{conversation_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    /// Conversation identifier.
    pub conversation_id: String,
    /// Messages in order.
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Owning user.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Question context.
    #[serde(default)]
    pub question_id: Option<String>,
    /// Session context.
    #[serde(default)]
    pub session_id: Option<String>,
}
