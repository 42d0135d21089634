//! Core model client
//!
//! Owns the HTTP client and the request/response plumbing shared by the
//! streaming and non-streaming calls.

use reqwest::Client;
use tracing::{debug, error};

use super::config::ChatClientConfig;
use crate::constants;
use crate::error::ChatError;

/// HTTP client for an Ollama-compatible server
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    config: ChatClientConfig,
}

impl ChatClient {
    /// Create the HTTP client with configuration suited to long streams
    fn create_http_client() -> Client {
        Client::builder()
            .user_agent(concat!("lochat/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(constants::http::CONNECT_TIMEOUT)
            // Local models on CPU can take minutes for a long answer
            .timeout(constants::http::STREAM_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build HTTP client: {}. Using default client.", e);
                Client::new()
            })
    }

    pub fn new(config: ChatClientConfig) -> Self {
        Self {
            http: Self::create_http_client(),
            config,
        }
    }

    pub fn config(&self) -> &ChatClientConfig {
        &self.config
    }

    pub(crate) fn http_client(&self) -> &Client {
        &self.http
    }

    /// JSON `POST` to `url`
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        debug!("POST {}", url);
        self.http
            .post(url)
            .header("content-type", "application/json")
    }

    /// Pass successful responses through, turn the rest into `RequestFailed`
    pub(crate) async fn handle_error_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ChatError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("Model server error response: {} - {}", status, body);
        Err(ChatError::RequestFailed {
            status: status.as_u16(),
            body,
        })
    }
}
