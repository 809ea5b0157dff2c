//! Access to the hosted chat-completion model.
//!
//! Generation only depends on the [`CompletionClient`] trait. [`OpenAiClient`]
//! is the production implementation; tests substitute scripted clients.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, StatusCode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{timeout, Duration};
use tracing::error;

use crate::prompt::Prompt;

/// Longest upstream error body echoed back in a [`CompletionError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Narrow capability over a hosted completion model: prompt in, raw text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &Prompt, temperature: f64) -> Result<String, CompletionError>;
}

/// Failure to obtain any text from the hosted model.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("API key is missing: set OPENAI_API_KEY")]
    MissingApiKey,

    #[error("invalid API key header value: {0}")]
    InvalidApiKey(#[source] reqwest::header::InvalidHeaderValue),

    #[error("completion request timed out")]
    Timeout,

    #[error("failed to send completion request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("completion request failed ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode completion response: {0}")]
    InvalidEnvelope(#[source] reqwest::Error),

    #[error("completion response contained no choices")]
    EmptyChoices,
}

#[derive(Clone)]
pub struct CompletionConfig {
    api_key: String,
    base_url: String,
    model: String,
    timeout_ms: u64,
}

impl CompletionConfig {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout_ms,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, CompletionError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyChoices)?;
        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }
}

/// Chat-completion client for OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: CompletionConfig,
    http: Client,
}

impl OpenAiClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    async fn send(
        &self,
        headers: HeaderMap,
        body: &ChatRequest<'_>,
    ) -> Result<String, CompletionError> {
        let response = self
            .http
            .post(self.config.endpoint())
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(CompletionError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response body>".to_string());
            error!(%status, %body, "completion endpoint returned an error");
            return Err(CompletionError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(CompletionError::InvalidEnvelope)?
            .into_text()
    }
}

/// Shortens an upstream error body before it reaches a caller.
fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        prompt: &Prompt,
        temperature: f64,
    ) -> Result<String, CompletionError> {
        if self.config.api_key.trim().is_empty() {
            return Err(CompletionError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
            .map_err(CompletionError::InvalidApiKey)?;
        headers.insert(AUTHORIZATION, bearer);

        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature,
        };

        timeout(
            Duration::from_millis(self.config.timeout_ms),
            self.send(headers, &body),
        )
        .await
        .map_err(|_| CompletionError::Timeout)?
    }
}
