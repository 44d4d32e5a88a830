//! Department assistant: chat replies, dashboard bodies and chart data.

use std::sync::Arc;

use super::charts::extract_charts;
use super::context::{assemble_context, DocumentSource};
use super::invoker::{ModelInvoker, ModelUnavailable};
use super::prompt::{chart_messages, chat_messages, dashboard_messages};
use super::LlmError;
use crate::models::{ChartDataEntry, ChatMessage};
use crate::personas::PersonaRegistry;

/// How many documents each call site feeds the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    pub chat: usize,
    pub dashboard: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            chat: 10,
            dashboard: 50,
        }
    }
}

/// Result of a chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Text produced by a model.
    Answer(String),
    /// Text produced locally when no model was asked or none answered.
    Notice(String),
}

impl ChatOutcome {
    pub fn text(&self) -> &str {
        match self {
            ChatOutcome::Answer(text) | ChatOutcome::Notice(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ChatOutcome::Answer(text) | ChatOutcome::Notice(text) => text,
        }
    }
}

pub struct Assistant {
    registry: Arc<PersonaRegistry>,
    documents: Arc<dyn DocumentSource>,
    invoker: ModelInvoker,
    limits: ContextLimits,
}

impl Assistant {
    pub fn new(
        registry: Arc<PersonaRegistry>,
        documents: Arc<dyn DocumentSource>,
        invoker: ModelInvoker,
        limits: ContextLimits,
    ) -> Self {
        Self {
            registry,
            documents,
            invoker,
            limits,
        }
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    /// Answer a chat message in the department's voice.
    ///
    /// Unknown departments and model outages come back as a
    /// [`ChatOutcome::Notice`]. Only a failing document store is an error.
    pub async fn chat(
        &self,
        department: &str,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<ChatOutcome, LlmError> {
        let Some(persona) = self.registry.persona(department) else {
            tracing::info!("Chat requested for unknown department {:?}", department);
            return Ok(ChatOutcome::Notice(format!("Unknown department: {}", department)));
        };

        let context = assemble_context(self.documents.as_ref(), self.limits.chat).await?;
        let messages = chat_messages(persona, &context, history, message);

        tracing::info!(department = persona.name, "Sending {} chat messages", messages.len());
        match self.invoker.invoke(&messages).await {
            Ok(reply) => Ok(ChatOutcome::Answer(reply)),
            Err(unavailable) => {
                tracing::warn!(department = persona.name, "No model answered: {}", unavailable);
                Ok(ChatOutcome::Notice(model_unavailable_reply(&unavailable)))
            }
        }
    }

    /// Generate the Markdown body of a department dashboard.
    pub async fn generate_dashboard(&self, department: &str) -> Result<String, LlmError> {
        let template = self
            .registry
            .dashboard_template(department)
            .ok_or_else(|| LlmError::UnknownDepartment(department.to_string()))?;

        let context = assemble_context(self.documents.as_ref(), self.limits.dashboard).await?;
        let messages = dashboard_messages(template, &context);

        tracing::info!(department, "Generating dashboard content");
        let content = self.invoker.invoke(&messages).await?;
        tracing::info!(department, "Dashboard generated ({} chars)", content.len());
        Ok(content)
    }

    /// Generate chart data for a department dashboard. Never fails; any problem
    /// yields an empty list.
    pub async fn generate_charts(&self, department: &str) -> Vec<ChartDataEntry> {
        let specs = match self.registry.chart_specs(department) {
            Some(specs) if !specs.is_empty() => specs,
            _ => return Vec::new(),
        };

        let context = match assemble_context(self.documents.as_ref(), self.limits.dashboard).await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(department, "Skipping charts, context unavailable: {}", e);
                return Vec::new();
            }
        };

        let raw = match self.invoker.invoke(&chart_messages(specs, &context)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(department, "Skipping charts: {}", e);
                return Vec::new();
            }
        };

        let charts = ChartDataEntry::from_values(extract_charts(&raw));
        if charts.is_empty() {
            tracing::warn!(department, "Model reply contained no usable charts");
        } else {
            tracing::info!(department, "Extracted {} charts", charts.len());
        }
        charts
    }
}

/// Assistant-visible text for a chat that no model could answer.
pub fn model_unavailable_reply(unavailable: &ModelUnavailable) -> String {
    format!(
        "Sorry, no LLM model is available. Tried models: {}. \
         Make sure Ollama is running and has a model pulled. Last error: {}",
        unavailable.attempted.join(", "),
        unavailable.last_error
    )
}
