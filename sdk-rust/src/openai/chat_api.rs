use serde::{Deserialize, Serialize};

// https://platform.openai.com/docs/api-reference/chat

#[derive(Debug, Clone, Serialize)]
pub struct CreateChatCompletionRequest {
    /// Model ID used to generate the response, like `gpt-3.5-turbo`.
    pub model: String,
    /// A list of messages comprising the conversation so far. The system
    /// preamble, when present, is the first entry.
    pub messages: Vec<ChatCompletionRequestMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Always `false`; the assistant consumes whole replies.
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequestMessage {
    /// One of `system`, `user` or `assistant`.
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChatCompletionResponse {
    /// A list of chat completion choices. Can be more than one if `n` is
    /// greater than 1.
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Option<CompletionUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponseMessage {
    /// The contents of the message.
    #[serde(default)]
    pub content: Option<String>,
    /// The refusal message generated by the model.
    #[serde(default)]
    pub refusal: Option<String>,
}

/// Usage statistics for the completion request.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionUsage {
    /// Number of tokens in the prompt.
    pub prompt_tokens: u32,
    /// Number of tokens in the generated completion.
    pub completion_tokens: u32,
}
