use crate::{
    context::DEFAULT_CONTEXT_CAPACITY,
    sink::{InteractionSink, TracingSink},
    AssistantClient,
};
use autofleet_llm::{create_language_model, LanguageModel, ProviderCredentials};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// Parameters required to create a new assistant client.
/// # Default Values
/// - `model`: `None` (every message is answered by the keyword responder)
/// - `instructions`: `vec![]`
/// - `max_tokens`: 500
/// - `temperature`: 0.7
/// - `request_timeout`: `None`
/// - `context_capacity`: 10
/// - `interaction_sink`: [`TracingSink`]
pub struct AssistantParams {
    /// The provider every message is sent to first. Chosen once; a failing
    /// provider is never swapped for another one.
    pub model: Option<Arc<dyn LanguageModel>>,
    /// Extra lines appended to the built-in system preamble.
    pub instructions: Vec<String>,
    /// Upper bound on generated tokens per reply.
    pub max_tokens: u32,
    /// Amount of randomness injected into the response. Ranges from 0.0 to 1.0
    pub temperature: f64,
    /// How long to wait for the provider before giving up on a message.
    pub request_timeout: Option<Duration>,
    /// Number of transcript messages kept in memory.
    pub context_capacity: usize,
    /// Where completed exchanges are reported.
    pub interaction_sink: Arc<dyn InteractionSink>,
}

impl Default for AssistantParams {
    fn default() -> Self {
        Self {
            model: None,
            instructions: Vec::new(),
            max_tokens: 500,
            temperature: 0.7,
            request_timeout: None,
            context_capacity: DEFAULT_CONTEXT_CAPACITY,
            interaction_sink: Arc::new(TracingSink),
        }
    }
}

impl AssistantParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a provider from `credentials` (OpenAI, then Gemini, then
    /// Anthropic). Without any usable key the client runs on the keyword
    /// responder alone.
    #[must_use]
    pub fn from_credentials(credentials: &ProviderCredentials) -> Self {
        let model = match credentials.select() {
            Some(config) => {
                info!(
                    provider = %config.kind,
                    model = config.model_id(),
                    "language model provider selected"
                );
                Some(create_language_model(config, None))
            }
            None => {
                info!("no language model provider configured, using keyword responder");
                None
            }
        };

        Self {
            model,
            ..Self::default()
        }
    }

    /// Set the language model
    #[must_use]
    pub fn model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Add an instruction
    #[must_use]
    pub fn add_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature for sampling
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Give up on the provider after `timeout`. The message then fails with
    /// [`crate::AssistantError::TimedOut`].
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn context_capacity(mut self, capacity: usize) -> Self {
        self.context_capacity = capacity;
        self
    }

    #[must_use]
    pub fn interaction_sink(mut self, sink: impl InteractionSink + 'static) -> Self {
        self.interaction_sink = Arc::new(sink);
        self
    }

    #[must_use]
    pub fn build(self) -> AssistantClient {
        AssistantClient::new(self)
    }
}
