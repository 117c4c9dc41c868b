use super::api::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part as GooglePart, UsageMetadata,
};
use crate::{
    client_utils, LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult,
    Message, ModelResponse, ModelUsage,
};
use reqwest::{header::HeaderMap, Client, Url};
use std::collections::HashMap;

const PROVIDER: &str = "google";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// History is inlined into a single prompt, so fewer turns are sent.
pub const HISTORY_WINDOW: usize = 6;

/// Gemini `generateContent`. The conversation is flattened into a single
/// text prompt and the API key travels in the query string.
pub struct GoogleModel {
    model_id: String,
    api_key: String,
    endpoint: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct GoogleModelOptions {
    pub api_key: String,
    /// Full `generateContent` URL, without the `key` query parameter.
    /// Defaults to the public endpoint for the model.
    pub endpoint: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl GoogleModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: GoogleModelOptions) -> Self {
        let GoogleModelOptions {
            api_key,
            endpoint,
            headers,
            client,
        } = options;

        let model_id = model_id.into();
        let endpoint = endpoint
            .unwrap_or_else(|| format!("{DEFAULT_BASE_URL}/models/{model_id}:generateContent"));

        Self {
            model_id,
            api_key,
            endpoint,
            client: client.unwrap_or_default(),
            headers: headers.unwrap_or_default(),
        }
    }

    fn request_url(&self) -> LanguageModelResult<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|error| {
            LanguageModelError::InvalidInput(format!(
                "Invalid Google endpoint '{}': {error}",
                self.endpoint
            ))
        })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        client_utils::insert_extra_headers(&mut headers, &self.headers, "Google")?;
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl LanguageModel for GoogleModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    fn history_window(&self) -> Option<usize> {
        Some(HISTORY_WINDOW)
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        crate::opentelemetry::trace_generate(
            self.provider(),
            &self.model_id,
            input,
            |input| async move {
                let request = convert_to_generate_content_request(input)?;
                let url = self.request_url()?;
                let headers = self.request_headers()?;

                let response: GenerateContentResponse = client_utils::send_json(
                    &self.client,
                    url.as_str(),
                    &request,
                    headers,
                    PROVIDER,
                )
                .await?;

                map_google_response(response)
            },
        )
        .await
    }
}

fn convert_to_generate_content_request(
    input: LanguageModelInput,
) -> LanguageModelResult<GenerateContentRequest> {
    let prompt = render_prompt(input.system_prompt.as_deref(), &input.messages)?;

    let generation_config = (input.max_tokens.is_some() || input.temperature.is_some()).then(|| {
        GenerationConfig {
            max_output_tokens: input.max_tokens,
            temperature: input.temperature,
        }
    });

    Ok(GenerateContentRequest {
        contents: vec![Content {
            role: None,
            parts: Some(vec![GooglePart { text: Some(prompt) }]),
        }],
        generation_config,
    })
}

/// Flatten the preamble, the earlier turns and the turn to answer into one
/// prompt:
///
/// ```text
/// <system prompt>
///
/// Conversation history:
/// User: ...
/// Assistant: ...
///
/// User: <latest message>
/// Assistant:
/// ```
pub(crate) fn render_prompt(
    system_prompt: Option<&str>,
    messages: &[Message],
) -> LanguageModelResult<String> {
    let (latest, history) = messages.split_last().ok_or_else(|| {
        LanguageModelError::InvalidInput("Google prompt requires at least one message".to_string())
    })?;

    let mut sections = Vec::new();
    if let Some(system_prompt) = system_prompt.filter(|prompt| !prompt.is_empty()) {
        sections.push(system_prompt.to_string());
    }
    if !history.is_empty() {
        let lines = history.iter().map(render_turn).collect::<Vec<_>>();
        sections.push(format!("Conversation history:\n{}", lines.join("\n")));
    }
    sections.push(format!("{}\nAssistant:", render_turn(latest)));

    Ok(sections.join("\n\n"))
}

fn render_turn(message: &Message) -> String {
    let speaker = match message {
        Message::User(_) => "User",
        Message::Assistant(_) => "Assistant",
    };
    format!("{speaker}: {}", message.content())
}

fn map_google_response(response: GenerateContentResponse) -> LanguageModelResult<ModelResponse> {
    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or_else(|| {
            LanguageModelError::Invariant(PROVIDER, "No candidate in response".to_string())
        })?;

    let text = candidate
        .content
        .and_then(|content| content.parts)
        .and_then(|parts| parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            LanguageModelError::Invariant(
                PROVIDER,
                format!("No text part in candidate (finish reason: {reason})"),
            )
        })?;

    Ok(ModelResponse {
        text,
        usage: response.usage_metadata.map(map_google_usage),
    })
}

fn map_google_usage(usage: UsageMetadata) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_token_count.unwrap_or_default(),
        output_tokens: usage.candidates_token_count.unwrap_or_default(),
    }
}
