//! Practice session service.

use std::sync::Arc;

use tracing::info;

use crate::api::{body_stream, ApiClient};
use crate::models::session::{SearchRequest, Session, SessionQuestions};
use crate::stream::envelope::Envelope;
use crate::stream::progress::await_session_id;
use crate::Result;

/// Creates sessions and looks them up.
#[derive(Debug, Clone)]
pub struct SessionService {
    api: Arc<ApiClient>,
}

impl SessionService {
    /// Create a service backed by `api`.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Create a session and wait for its identifier.
    ///
    /// Every progress envelope is passed to `on_progress`. If the backend
    /// closes the stream without announcing a session the future never
    /// resolves; wrap it in a timeout.
    ///
    /// # Errors
    ///
    /// - `AppError::Transport` on network failure.
    /// - `AppError::Http` on a non-2xx status.
    /// - `AppError::Protocol` when the stream reports an error envelope.
    pub async fn create_session<F>(&self, request: &SearchRequest, on_progress: F) -> Result<String>
    where
        F: FnMut(&Envelope),
    {
        info!(
            subject = request.subject.as_str(),
            topics = request.topics.len(),
            "creating session"
        );
        let response = self
            .api
            .post_stream("/sessions/create", Some(request))
            .await?;
        await_session_id(body_stream(response), self.api.framer(), on_progress).await
    }

    /// Fetch a session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` (404) when the session does not exist.
    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        self.api.get(&format!("/sessions/{session_id}")).await
    }

    /// Fetch the questions of a session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` (404) when the session has no questions.
    pub async fn get_session_questions(&self, session_id: &str) -> Result<SessionQuestions> {
        self.api
            .get(&format!("/sessions/{session_id}/questions"))
            .await
    }
}
