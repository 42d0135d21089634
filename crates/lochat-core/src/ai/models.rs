//! Installed model listing
//!
//! The server reports what it has pulled via `GET /api/tags`. When that is
//! unreachable the client still offers a small fixed list so the model
//! picker is never empty.

use tracing::{info, warn};

use super::client::ChatClient;
use super::types::{ModelInfo, ModelList};
use crate::constants;
use crate::error::ChatError;

/// Models offered when the server cannot be asked
pub fn fallback_models() -> Vec<ModelInfo> {
    constants::ai::FALLBACK_MODELS
        .iter()
        .map(|name| ModelInfo::placeholder(name))
        .collect()
}

impl ChatClient {
    /// Fetch installed models, surfacing any failure
    pub async fn try_list_models(&self) -> Result<Vec<ModelInfo>, ChatError> {
        let response = self
            .http_client()
            .get(self.config().tags_url())
            .timeout(constants::http::LIST_TIMEOUT)
            .send()
            .await?;
        let response = self.handle_error_response(response).await?;

        let body = response.text().await?;
        let list: ModelList =
            serde_json::from_str(&body).map_err(|e| ChatError::InvalidResponse(e.to_string()))?;
        Ok(list.models)
    }

    /// Fetch installed models, falling back to [`fallback_models`]
    ///
    /// An empty upstream list also falls back.
    pub async fn list_models(&self) -> Vec<ModelInfo> {
        match self.try_list_models().await {
            Ok(models) if !models.is_empty() => {
                info!("Model server reports {} models", models.len());
                models
            }
            Ok(_) => {
                warn!("Model server reports no models, using fallback list");
                fallback_models()
            }
            Err(e) => {
                warn!("Failed to list models, using fallback list: {}", e);
                fallback_models()
            }
        }
    }
}
