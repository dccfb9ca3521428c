use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One versioned prompt row. Rows are immutable once written: new behavior
/// means a new version, and only `is_active` ever changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromptDefinition {
    pub id: Uuid,
    pub prompt_key: String,
    /// Assigned by the registry, monotonically increasing per key, never
    /// client-supplied.
    pub version: i32,
    pub template: String,
    pub input_schema: Value,
    pub output_schema: Value,
    pub system_instructions: String,
    pub user_instructions: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a new version. The registry
/// owns `version`, `is_active` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPromptVersion {
    pub template: String,
    pub input_schema: Value,
    pub output_schema: Value,
    #[serde(default)]
    pub system_instructions: String,
    #[serde(default)]
    pub user_instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,
    pub created_by: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// One entry of the message list handed to the LLM collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}
