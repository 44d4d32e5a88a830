//! Conversation models shared by the chat API and the prompt builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker of a message sent to the model backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// A single `{role, content}` turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
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

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A persisted chat turn for one user and department.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversationMessage {
    pub user_id: String,
    pub department: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationMessage {
    /// Strip the bookkeeping fields, leaving the prompt-ready turn.
    pub fn to_chat_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Request body for POST /api/chat.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub department: String,
    pub message: String,
    /// Prior turns, oldest first. When absent the stored history is replayed.
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
}

/// Response body for POST /api/chat.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub department: String,
    pub reply: String,
}

/// Query string selecting a department's chat history.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    pub department: String,
}
