//! Question service.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::models::question::{Question, SaveAnswerResponse, StudentAnswer};
use crate::Result;

/// Looks up questions and saves answers.
#[derive(Debug, Clone)]
pub struct QuestionService {
    api: Arc<ApiClient>,
}

impl QuestionService {
    /// Create a service backed by `api`.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Fetch a question.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` (404) when the question does not exist.
    pub async fn get_question(&self, question_id: &str) -> Result<Question> {
        self.api.get(&format!("/questions/{question_id}")).await
    }

    /// Save the student's answer to a question.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` when the backend rejects the answer.
    pub async fn save_answer(
        &self,
        question_id: &str,
        answer: &StudentAnswer,
    ) -> Result<SaveAnswerResponse> {
        self.api
            .post(&format!("/questions/{question_id}/save-answer"), Some(answer))
            .await
    }
}
