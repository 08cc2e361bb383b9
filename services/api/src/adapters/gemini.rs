//! services/api/src/adapters/gemini.rs
//!
//! Adapter for the Gemini `generateContent` endpoint. Implements the
//! `GenerativeModelService` port from the `core` crate.

use async_trait::async_trait;
use auramind_core::ports::{GenerativeModelService, PortError, PortResult};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub struct GeminiAdapter {
    client: Client,
    api_base: String,
}

impl GeminiAdapter {
    /// `api_base` is the versioned root, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }
}

/// Every prompt part becomes its own content element.
fn request_body(parts: &[String]) -> Value {
    let contents: Vec<Value> = parts
        .iter()
        .map(|text| json!({ "parts": [{ "text": text }] }))
        .collect();
    json!({ "contents": contents })
}

/// `candidates[0].content.parts[0].text`, or empty when the shape differs.
fn first_candidate_text(body: &Value) -> String {
    body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl GenerativeModelService for GeminiAdapter {
    async fn generate_content(
        &self,
        model: &str,
        credential: &str,
        parts: &[String],
    ) -> PortResult<String> {
        let response = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", credential)])
            .json(&request_body(parts))
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| PortError::Transport(e.to_string()))?;
            warn!(%status, model, "Gemini returned an error status");
            return Err(PortError::Api(body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let text = first_candidate_text(&body);
        debug!(model, chars = text.len(), "Gemini response received");
        Ok(text)
    }
}
