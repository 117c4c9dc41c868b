use super::chat_api::{
    ChatCompletionRequestMessage, CompletionUsage, CreateChatCompletionRequest,
    CreateChatCompletionResponse,
};
use crate::{
    client_utils, LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult,
    ModelResponse, ModelUsage,
};
use reqwest::{
    header::{self, HeaderMap},
    Client,
};
use std::collections::HashMap;

const PROVIDER: &str = "openai";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Chat completions over any OpenAI-compatible endpoint.
pub struct OpenAIChatModel {
    model_id: String,
    api_key: String,
    endpoint: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct OpenAIChatModelOptions {
    /// Full chat completions URL. Defaults to [`DEFAULT_ENDPOINT`].
    pub endpoint: Option<String>,
    pub api_key: String,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl OpenAIChatModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: OpenAIChatModelOptions) -> Self {
        let OpenAIChatModelOptions {
            endpoint,
            api_key,
            headers,
            client,
        } = options;

        Self {
            model_id: model_id.into(),
            api_key,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            client: client.unwrap_or_default(),
            headers: headers.unwrap_or_default(),
        }
    }

    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            client_utils::header_value("OpenAI API key", &format!("Bearer {}", self.api_key))?,
        );
        client_utils::insert_extra_headers(&mut headers, &self.headers, "OpenAI")?;
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl LanguageModel for OpenAIChatModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        crate::opentelemetry::trace_generate(
            self.provider(),
            &self.model_id,
            input,
            |input| async move {
                let request = convert_to_openai_create_params(input, &self.model_id);
                let headers = self.request_headers()?;

                let response: CreateChatCompletionResponse = client_utils::send_json(
                    &self.client,
                    &self.endpoint,
                    &request,
                    headers,
                    PROVIDER,
                )
                .await?;

                map_openai_response(response)
            },
        )
        .await
    }
}

fn convert_to_openai_create_params(
    input: LanguageModelInput,
    model_id: &str,
) -> CreateChatCompletionRequest {
    let LanguageModelInput {
        system_prompt,
        messages,
        max_tokens,
        temperature,
    } = input;

    let system = system_prompt.map(|content| ChatCompletionRequestMessage {
        role: "system",
        content,
    });
    let messages = system
        .into_iter()
        .chain(messages.into_iter().map(|message| ChatCompletionRequestMessage {
            role: message.role(),
            content: message.content().to_string(),
        }))
        .collect();

    CreateChatCompletionRequest {
        model: model_id.to_string(),
        messages,
        max_tokens,
        temperature,
        stream: false,
    }
}

fn map_openai_response(
    response: CreateChatCompletionResponse,
) -> LanguageModelResult<ModelResponse> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        LanguageModelError::Invariant(PROVIDER, "No choices in response".to_string())
    })?;
    let message = choice.message;

    if let Some(refusal) = message.refusal.filter(|refusal| !refusal.is_empty()) {
        return Err(LanguageModelError::Refusal(refusal));
    }

    let text = message.content.ok_or_else(|| {
        LanguageModelError::Invariant(PROVIDER, "No content in response message".to_string())
    })?;

    Ok(ModelResponse {
        text,
        usage: response.usage.map(map_openai_usage),
    })
}

fn map_openai_usage(usage: CompletionUsage) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
    }
}
