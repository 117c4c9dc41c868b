use serde::{Deserialize, Serialize};

// https://docs.anthropic.com/en/api/messages

#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageParams {
    pub model: String,
    /// System prompt, sent outside the message list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Input messages. The first one must come from the user.
    pub messages: Vec<InputMessage>,
    /// The maximum number of tokens to generate before stopping. Required by
    /// the API.
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Content generated by the model, as an ordered list of blocks.
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
