//! Ordered model fallback.

use std::sync::Arc;

use thiserror::Error;

use super::backend::ModelBackend;
use crate::models::ChatMessage;

/// Models to try, in order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPreference {
    models: Vec<String>,
}

impl ModelPreference {
    /// A fallback equal to the primary is not tried twice.
    pub fn new(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        let primary = primary.into();
        let fallback = fallback.into();
        let mut models = vec![primary];
        if fallback != models[0] {
            models.push(fallback);
        }
        Self { models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}

/// Every model in the preference list failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("all models failed (tried: {}); last error: {last_error}", .attempted.join(", "))]
pub struct ModelUnavailable {
    pub attempted: Vec<String>,
    pub last_error: String,
}

/// Sends a message list down the preference list until a model answers.
///
/// Each model gets exactly one attempt with the same messages. There is no
/// backoff and no second pass over the list.
pub struct ModelInvoker {
    backend: Arc<dyn ModelBackend>,
    preference: ModelPreference,
}

impl ModelInvoker {
    pub fn new(backend: Arc<dyn ModelBackend>, preference: ModelPreference) -> Self {
        Self {
            backend,
            preference,
        }
    }

    /// Reply text from the first model that succeeds.
    pub async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ModelUnavailable> {
        let mut last_error = String::from("no model attempted");

        for model in self.preference.models() {
            tracing::info!(model = %model, messages = messages.len(), "Querying model");

            match self.backend.chat(model, messages).await {
                Ok(response) => {
                    let reply = response.into_reply();
                    tracing::info!(model = %model, "Got reply ({} chars)", reply.content.len());
                    return Ok(reply.content);
                }
                Err(e) => {
                    tracing::warn!(model = %model, "Model attempt failed: {}", e);
                    last_error = e.to_string();
                }
            }
        }

        let unavailable = ModelUnavailable {
            attempted: self.preference.models().to_vec(),
            last_error,
        };
        tracing::error!("{}", unavailable);
        Err(unavailable)
    }
}
