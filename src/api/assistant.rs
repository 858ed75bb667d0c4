//! Chat assistant service.

use std::sync::Arc;

use tracing::info;

use crate::api::{body_stream, is_buffered, ApiClient};
use crate::models::assistant::{AssistantRequest, Conversation};
use crate::stream::decoder::{decode_buffered, decode_stream};
use crate::Result;

/// Path of the assistant endpoint.
pub const ASSISTANT_ENDPOINT: &str = "/assistant";

/// Sends student questions to the assistant and decodes its replies.
#[derive(Debug, Clone)]
pub struct AssistantService {
    api: Arc<ApiClient>,
}

impl AssistantService {
    /// Create a service backed by `api`.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Ask the assistant and wait for the full reply.
    ///
    /// `on_status` receives progress text while the backend works; it is
    /// never called after this future resolves.
    ///
    /// # Errors
    ///
    /// - `AppError::Transport` on network failure.
    /// - `AppError::Http` on a non-2xx status.
    /// - `AppError::Protocol` when the stream reports an error envelope.
    pub async fn send_message<F>(&self, request: &AssistantRequest, on_status: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        info!(
            user_id = request.user_id.as_str(),
            len = request.user_question.len(),
            "sending assistant message"
        );
        let response = self.api.post_stream(ASSISTANT_ENDPOINT, Some(request)).await?;

        if is_buffered(&response) {
            let text = response.text().await?;
            return Ok(decode_buffered(&text));
        }

        decode_stream(body_stream(response), self.api.framer(), on_status).await
    }

    /// Fetch a stored conversation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` (404) when the conversation does not exist.
    pub async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        self.api
            .get(&format!("{ASSISTANT_ENDPOINT}/{conversation_id}"))
            .await
    }
}
