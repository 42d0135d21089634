//! Simple (non-streaming) chat calls

use tracing::{debug, warn};

use super::core::ChatClient;
use crate::ai::types::{ChatRecord, ChatRequest};
use crate::error::ChatError;

impl ChatClient {
    /// Send a chat request and return the whole reply
    ///
    /// A body without `message.content` yields an empty reply.
    pub async fn chat_complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        debug!("Non-streaming chat call, model: {}", request.model);

        let response = self
            .build_request(&self.config().chat_url())
            .json(request)
            .send()
            .await?;
        let response = self.handle_error_response(response).await?;

        let body = response.text().await?;
        let record: ChatRecord = serde_json::from_str(&body)
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        if let Some(error) = record.error.as_deref() {
            warn!("Model server reported error: {}", error);
        }

        Ok(record.content().unwrap_or_default().to_string())
    }
}
