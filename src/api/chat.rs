//! Chat endpoints.

use axum::extract::{Query, State};
use axum::Json;

use super::{success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::llm::ChatOutcome;
use crate::models::{ChatMessage, ChatReply, ChatRequest, HistoryQuery};
use crate::AppState;

/// POST /api/chat - Ask a department representative a question.
pub async fn chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatReply> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    let Some(department) = state.personas.get(&request.department).map(|d| d.name()) else {
        // Unknown departments get a notice, but nothing is recorded.
        let outcome = state
            .assistant
            .chat(&request.department, &request.message, &[])
            .await?;
        return success(ChatReply {
            department: request.department,
            reply: outcome.into_text(),
        });
    };

    let history = match request.history {
        Some(history) => history,
        None => state
            .repo
            .list_messages(user.as_str(), department, state.config.history_limit)
            .await?
            .iter()
            .map(|m| m.to_chat_message())
            .collect(),
    };

    let outcome = state
        .assistant
        .chat(department, &request.message, &history)
        .await?;

    // Only model answers become history; outage notices are not replayed.
    if let ChatOutcome::Answer(reply) = &outcome {
        state
            .repo
            .append_exchange(user.as_str(), department, &request.message, reply)
            .await?;
    }

    success(ChatReply {
        department: request.department,
        reply: outcome.into_text(),
    })
}

/// GET /api/chat/history?department=X - Stored conversation, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<ChatMessage>> {
    let department = canonical_department(&state, &query.department)?;
    let messages = state
        .repo
        .list_messages(user.as_str(), department, state.config.history_limit)
        .await?;

    success(messages.iter().map(|m| m.to_chat_message()).collect())
}

/// DELETE /api/chat/history?department=X - Forget a conversation.
pub async fn clear_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<()> {
    let department = canonical_department(&state, &query.department)?;
    let removed = state.repo.clear_messages(user.as_str(), department).await?;
    tracing::info!(user = user.as_str(), department, "Cleared {} messages", removed);

    success(())
}

fn canonical_department(state: &AppState, department: &str) -> Result<&'static str, AppError> {
    state
        .personas
        .get(department)
        .map(|d| d.name())
        .ok_or_else(|| AppError::UnknownDepartment(department.to_string()))
}
