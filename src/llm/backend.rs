//! Generative model backend.
//!
//! Replies are decoded into [`BackendResponse`] as soon as they arrive and
//! normalized into a single assistant [`ChatMessage`]; nothing downstream looks
//! at the raw wire format.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ChatMessage, Role};

/// Failure reported by a backend for one model attempt.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Message object as it appears inside backend replies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseChoice {
    pub message: ResponseMessage,
}

/// Reply shapes a backend is known to produce.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BackendResponse {
    /// Ollama native: `{"message": {"role": ..., "content": ...}, ...}`
    Message { message: ResponseMessage },
    /// OpenAI compatible: `{"choices": [{"message": {...}}], ...}`
    Choices { choices: Vec<ResponseChoice> },
    /// Anything else that is still valid JSON.
    Unrecognized(serde_json::Value),
}

impl BackendResponse {
    /// Collapse any reply shape into one assistant message.
    pub fn into_reply(self) -> ChatMessage {
        match self {
            BackendResponse::Message { message } => message.into_chat_message(),
            BackendResponse::Choices { choices } => match choices.into_iter().next() {
                Some(choice) => choice.message.into_chat_message(),
                None => {
                    tracing::warn!("Backend response had an empty choices list");
                    ChatMessage::assistant(serde_json::json!({ "choices": [] }).to_string())
                }
            },
            BackendResponse::Unrecognized(raw) => {
                tracing::warn!("Unexpected backend response shape: {}", raw);
                let text = match raw {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                ChatMessage::assistant(text)
            }
        }
    }
}

impl ResponseMessage {
    fn into_chat_message(self) -> ChatMessage {
        let role = self
            .role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or(Role::Assistant);
        ChatMessage {
            role,
            content: self.content.unwrap_or_default(),
        }
    }
}

/// A service that can answer a message list with a named model.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<BackendResponse, BackendError>;
}

/// Ollama `/api/chat` client.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaBackend {
    /// `timeout` of `None` leaves requests unbounded; callers own the deadline.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Resolve the chat endpoint from the configured base URL.
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/api/chat") {
            base.to_string()
        } else if base.ends_with("/api") {
            format!("{}/chat", base)
        } else {
            format!("{}/api/chat", base)
        }
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<BackendResponse, BackendError> {
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        let resp = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| BackendError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str::<BackendResponse>(&text)
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))
    }
}
