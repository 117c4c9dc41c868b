use super::api::{
    ContentBlock, CreateMessageParams, InputMessage, Message as AnthropicMessage, Usage,
};
use crate::{
    client_utils, LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult,
    Message, ModelResponse, ModelUsage,
};
use reqwest::{
    header::{self, HeaderMap},
    Client,
};
use std::collections::HashMap;

const PROVIDER: &str = "anthropic";
const DEFAULT_API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

pub struct AnthropicModel {
    model_id: String,
    api_key: String,
    endpoint: String,
    api_version: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct AnthropicModelOptions {
    /// Full messages URL. Defaults to [`DEFAULT_ENDPOINT`].
    pub endpoint: Option<String>,
    pub api_key: String,
    pub api_version: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl AnthropicModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, mut options: AnthropicModelOptions) -> Self {
        let endpoint = options
            .endpoint
            .take()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let api_version = options
            .api_version
            .take()
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let client = options.client.take().unwrap_or_default();

        let headers = options.headers.unwrap_or_default();

        Self {
            model_id: model_id.into(),
            api_key: options.api_key,
            endpoint,
            api_version,
            client,
            headers,
        }
    }

    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        // Proxies in front of the API expect a bearer token, the API itself
        // reads `x-api-key`.
        headers.insert(
            header::AUTHORIZATION,
            client_utils::header_value("Anthropic API key", &format!("Bearer {}", self.api_key))?,
        );
        headers.insert(
            "x-api-key",
            client_utils::header_value("Anthropic API key", &self.api_key)?,
        );
        headers.insert(
            "anthropic-version",
            client_utils::header_value("Anthropic version", &self.api_version)?,
        );
        client_utils::insert_extra_headers(&mut headers, &self.headers, "Anthropic")?;

        Ok(headers)
    }
}

#[async_trait::async_trait]
impl LanguageModel for AnthropicModel {
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
                let request = convert_to_anthropic_create_params(input, &self.model_id)?;
                let headers = self.request_headers()?;

                let response: AnthropicMessage = client_utils::send_json(
                    &self.client,
                    &self.endpoint,
                    &request,
                    headers,
                    PROVIDER,
                )
                .await?;

                map_anthropic_message(response)
            },
        )
        .await
    }
}

fn convert_to_anthropic_create_params(
    input: LanguageModelInput,
    model_id: &str,
) -> LanguageModelResult<CreateMessageParams> {
    let LanguageModelInput {
        system_prompt,
        messages,
        max_tokens,
        temperature,
    } = input;

    let messages = messages
        .iter()
        .skip_while(|message| matches!(message, Message::Assistant(_)))
        .map(|message| InputMessage {
            role: message.role(),
            content: message.content().to_string(),
        })
        .collect::<Vec<_>>();

    if messages.is_empty() {
        return Err(LanguageModelError::InvalidInput(
            "Anthropic request requires at least one user message".to_string(),
        ));
    }

    Ok(CreateMessageParams {
        model: model_id.to_string(),
        system: system_prompt,
        messages,
        max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        temperature,
    })
}

fn map_anthropic_message(message: AnthropicMessage) -> LanguageModelResult<ModelResponse> {
    let text = match message.content.into_iter().next() {
        Some(ContentBlock::Text { text }) => text,
        Some(ContentBlock::Other) => {
            return Err(LanguageModelError::Invariant(
                PROVIDER,
                "First content block is not text".to_string(),
            ))
        }
        None => {
            let reason = message.stop_reason.as_deref().unwrap_or("unknown");
            return Err(LanguageModelError::Invariant(
                PROVIDER,
                format!("No content in response (stop reason: {reason})"),
            ));
        }
    };

    Ok(ModelResponse {
        text,
        usage: message.usage.map(map_anthropic_usage),
    })
}

fn map_anthropic_usage(usage: Usage) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.input_tokens,
        output_tokens: usage.output_tokens,
    }
}
