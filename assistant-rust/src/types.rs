use autofleet_llm::Message;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Creation time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::now(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(Role::Assistant, content)
    }

    fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Some(chrono::Utc::now().timestamp_millis()),
        }
    }
}

impl From<&ChatMessage> for Message {
    fn from(message: &ChatMessage) -> Self {
        match message.role {
            Role::User => Self::user(message.content.clone()),
            Role::Assistant => Self::assistant(message.content.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Navigation,
    Confirmation,
    Error,
}

/// What the chat widget renders for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    pub message: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResponseKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_url: Option<String>,
    pub suggestions: Vec<String>,
}

impl AssistantResponse {
    pub fn text(message: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
            navigation_url: None,
            suggestions,
        }
    }

    pub fn navigation(
        message: impl Into<String>,
        url: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            message: message.into(),
            kind: Some(ResponseKind::Navigation),
            navigation_url: Some(url.into()),
            suggestions,
        }
    }

    pub fn error(message: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            message: message.into(),
            kind: Some(ResponseKind::Error),
            navigation_url: None,
            suggestions,
        }
    }
}
