//! Generative-text seam and the Messages API client

use crate::error::SynthError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Messages API root
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

/// API version header value
pub const API_VERSION: &str = "2023-06-01";

/// Default model
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// One generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Produces text from a system instruction and a user prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, SynthError>;
}

#[derive(Debug, Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Messages API client
#[derive(Clone)]
pub struct MessagesClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for MessagesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagesClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl MessagesClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SynthError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Model name sent with every request
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for MessagesClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, SynthError> {
        let body = MessagesBody {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));

        tracing::debug!(model = %self.model, max_tokens = request.max_tokens, "Requesting brief");
        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map_or_else(|_| raw.chars().take(200).collect(), |e| e.error.message);
            return Err(SynthError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&raw).map_err(|e| SynthError::Decode(e.to_string()))?;
        let text: String = parsed
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            return Err(SynthError::EmptyOutput);
        }
        Ok(text)
    }
}
