//! Practice session models.

use serde::{Deserialize, Serialize};

use crate::models::question::Subject;

/// Whether a session is graded as a practice run or a test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Immediate feedback per question.
    #[default]
    Practice,
    /// Graded at the end.
    Test,
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Questions remain unanswered.
    InProgress,
    /// Session graded.
    Completed,
}

/// Body of `POST /sessions/create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    /// Subject to draw questions from.
    pub subject: String,
    /// Topics within the subject.
    pub topics: Vec<String>,
    /// Inclusive range for the number of generated questions.
    pub num_questions_range: (u32, u32),
    /// Practice or test.
    pub mode: SessionMode,
    /// Free-form instructions for the question generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    /// Owner of the new session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Session record returned by `GET /sessions/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Session identifier.
    pub id: String,
    /// Subject of the session.
    pub subject: Subject,
    /// Topics covered.
    #[serde(default)]
    pub topics: Vec<String>,
    /// Question ids, in order.
    pub questions: Vec<String>,
    /// Number of questions.
    pub num_questions: u32,
    /// Number of questions answered so far.
    pub num_questions_answered: u32,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Creation timestamp as sent by the backend.
    pub created_at: String,
    /// Practice or test.
    pub mode: SessionMode,
    /// Percentage score once graded.
    #[serde(default)]
    pub score: Option<f64>,
}

impl Session {
    /// Whether every question has been answered.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Completed
            || self.num_questions_answered >= self.num_questions
    }
}

/// Body of `GET /sessions/{id}/questions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionQuestions {
    /// Questions of the session.
    pub questions: Vec<crate::models::question::Question>,
    /// Number of questions returned.
    pub count: u32,
}
