//! Streaming chat calls
//!
//! The response body is NDJSON; fragments are decoded as chunks arrive.

use futures::stream::BoxStream;
use futures::StreamExt;
use std::time::Instant;
use tracing::info;

use super::core::ChatClient;
use crate::ai::ndjson::decode_stream;
use crate::ai::types::ChatRequest;
use crate::error::ChatError;

/// Text fragments of one streamed reply, in arrival order
pub type FragmentStream = BoxStream<'static, Result<String, ChatError>>;

impl ChatClient {
    /// Send a streaming chat request
    ///
    /// Resolves once response headers arrive; dropping the returned stream
    /// closes the connection.
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream, ChatError> {
        let call_start = Instant::now();
        info!(
            "=== CHAT STREAM START === model: {}, messages: {}, temperature: {}",
            request.model,
            request.messages.len(),
            request.sampling.temperature
        );

        let response = self
            .build_request(&self.config().chat_url())
            .json(request)
            .send()
            .await?;
        let response = self.handle_error_response(response).await?;
        info!("Response headers after {:?}", call_start.elapsed());

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ChatError::Transport));
        Ok(decode_stream(body).boxed())
    }
}
