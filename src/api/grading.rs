//! Grading service.

use std::sync::Arc;

use crate::api::{body_stream, ApiClient};
use crate::models::grading::{AutoGradeResponse, TestResult};
use crate::stream::envelope::Envelope;
use crate::stream::progress::await_grading;
use crate::Result;

/// Grades sessions and individual questions.
#[derive(Debug, Clone)]
pub struct GradingService {
    api: Arc<ApiClient>,
}

impl GradingService {
    /// Create a service backed by `api`.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Grade a whole session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` when the session is unknown or has no
    /// questions.
    pub async fn grade_session(&self, session_id: &str) -> Result<TestResult> {
        self.api
            .post::<(), _>(&format!("/grade/session/{session_id}"), None)
            .await
    }

    /// Auto-grade the saved answer of a single question.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` when the question is unknown or unanswered.
    pub async fn grade_question(&self, question_id: &str) -> Result<AutoGradeResponse> {
        self.api
            .post::<(), _>(&format!("/grade/question/{question_id}"), None)
            .await
    }

    /// Grade a free-response question, forwarding progress envelopes.
    ///
    /// Resolves on the `final` envelope or when the stream ends.
    ///
    /// # Errors
    ///
    /// - `AppError::Transport` on network failure.
    /// - `AppError::Http` on a non-2xx status.
    /// - `AppError::Protocol` when the stream reports an error envelope.
    pub async fn grade_free_response<F>(&self, question_id: &str, on_progress: F) -> Result<()>
    where
        F: FnMut(&Envelope),
    {
        let response = self
            .api
            .post_stream::<()>(&format!("/grade/free-response/{question_id}"), None)
            .await?;
        await_grading(body_stream(response), self.api.framer(), on_progress).await
    }
}
