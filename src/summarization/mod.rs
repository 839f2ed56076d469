//! Client abstraction for the remote chat-completion API that produces summaries.
//!
//! The production adapter speaks the OpenAI-compatible `/chat/completions` protocol (Together AI
//! by default) and authenticates with a bearer key taken from [`Config`]. The processing layer
//! only sees the [`ChatCompletionClient`] trait so tests can substitute a stub.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider could not be reached (DNS, TLS, connection refused, ...).
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider answered with a non-success status.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed or carried no content.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instruction that constrains the assistant.
    System,
    /// Content supplied on behalf of the end user.
    User,
}

/// One entry of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Who is speaking.
    pub role: ChatRole,
    /// Message body.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Request payload passed to the chat-completion provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    /// Fully qualified model identifier understood by the provider.
    pub model: String,
    /// Conversation to complete.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Interface implemented by chat-completion providers.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Return the assistant's reply for the supplied conversation.
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<String, SummarizationClientError>;
}

/// Chat-completion client for OpenAI-compatible HTTP APIs.
pub struct OpenAiCompatibleClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatibleClient {
    /// Build a client from explicit settings.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, SummarizationClientError> {
        let http = Client::builder()
            .user_agent(concat!("cruxify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to construct HTTP client: {error}"
                ))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client using the endpoint and credential from configuration.
    pub fn from_config(config: &Config) -> Result<Self, SummarizationClientError> {
        Self::new(config.api_base_url.clone(), config.api_key.clone())
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatCompletionClient for OpenAiCompatibleClient {
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<String, SummarizationClientError> {
        tracing::debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "Requesting chat completion"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "provider returned {status}: {body}"
            )));
        }

        let body: CompletionResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode completion response: {error}"
            ))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                SummarizationClientError::InvalidResponse("response contained no choices".into())
            })
    }
}
