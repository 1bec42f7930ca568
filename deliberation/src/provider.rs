//! Model-capability boundary: chat message model, the completion provider
//! trait, and the OpenAI-compatible HTTP client.
//!
//! The engine treats text generation as a black box: an ordered list of
//! role-tagged messages goes in, one completion comes out. Rate limiting,
//! retries, and authentication renewal are the transport's responsibility.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::DeliberationConfig;
use crate::error::ProviderError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
}

/// One entry of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The model capability consumed by both deliberation strategies.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate one completion for the given conversation.
    async fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        model: &str,
    ) -> Result<String, ProviderError>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Build from `OPENAI_API_KEY` and (optionally) `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ProviderError::MissingApiKey("OPENAI_API_KEY".to_string()))?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());
        Ok(Self::new(base_url, api_key))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        model: &str,
    ) -> Result<String, ProviderError> {
        let request_body = serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": temperature,
        });

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let resp_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        resp_json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::Parse("missing choices[0].message.content".to_string())
            })
    }
}

/// The single request/response leaf both strategies are built on.
///
/// `ephemeral` is an instruction sent as a trailing user message for this
/// call only; it is never stored in the caller's history. Only the phase's
/// *output* persists, as whatever the caller appends afterwards.
pub struct Responder<'a> {
    provider: &'a dyn CompletionProvider,
    config: &'a DeliberationConfig,
}

impl<'a> Responder<'a> {
    pub fn new(provider: &'a dyn CompletionProvider, config: &'a DeliberationConfig) -> Self {
        Self { provider, config }
    }

    /// Issue one exchange over `conversation`, optionally extended with an
    /// ephemeral instruction.
    pub async fn send(
        &self,
        conversation: &[Message],
        ephemeral: Option<&str>,
    ) -> Result<String, ProviderError> {
        match ephemeral {
            Some(instruction) => {
                let mut messages = conversation.to_vec();
                messages.push(Message::user(instruction));
                self.provider
                    .complete(&messages, self.config.temperature, &self.config.model)
                    .await
            }
            None => {
                self.provider
                    .complete(conversation, self.config.temperature, &self.config.model)
                    .await
            }
        }
    }
}
