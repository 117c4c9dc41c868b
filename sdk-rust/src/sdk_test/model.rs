use std::{collections::VecDeque, sync::Mutex};

use crate::{
    errors::{LanguageModelError, LanguageModelResult},
    language_model::LanguageModel,
    LanguageModelInput, ModelResponse,
};

/// Result for a mocked `generate` call.
pub enum MockGenerateResult {
    Response(ModelResponse),
    Error(LanguageModelError),
    /// Never resolves. Lets tests hold a request in flight until the caller
    /// drops or cancels it.
    Pending,
}

impl MockGenerateResult {
    /// Construct a result that yields a response with the given text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Response(ModelResponse {
            text: text.into(),
            usage: None,
        })
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: LanguageModelError) -> Self {
        Self::Error(error)
    }
}

impl From<ModelResponse> for MockGenerateResult {
    fn from(response: ModelResponse) -> Self {
        Self::Response(response)
    }
}

impl From<LanguageModelError> for MockGenerateResult {
    fn from(error: LanguageModelError) -> Self {
        Self::Error(error)
    }
}

impl From<LanguageModelResult<ModelResponse>> for MockGenerateResult {
    fn from(result: LanguageModelResult<ModelResponse>) -> Self {
        match result {
            Ok(response) => Self::Response(response),
            Err(error) => Self::Error(error),
        }
    }
}

#[derive(Default)]
struct MockLanguageModelState {
    mocked_generate_results: VecDeque<MockGenerateResult>,
    tracked_generate_inputs: Vec<LanguageModelInput>,
}

/// A mock language model for testing that tracks inputs and yields predefined
/// outputs in order.
pub struct MockLanguageModel {
    provider: &'static str,
    model_id: String,
    history_window: Option<usize>,
    state: Mutex<MockLanguageModelState>,
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self {
            provider: "mock",
            model_id: "mock-model".to_string(),
            history_window: None,
            state: Mutex::new(MockLanguageModelState::default()),
        }
    }
}

impl MockLanguageModel {
    /// Construct a new mock language model instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the provider identifier returned by the mock.
    #[must_use]
    pub fn with_provider(mut self, provider: &'static str) -> Self {
        self.provider = provider;
        self
    }

    /// Override the model identifier returned by the mock.
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Report a provider-specific history window.
    #[must_use]
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = Some(window);
        self
    }

    /// Enqueue a single mocked generate result.
    ///
    /// # Panics
    ///
    /// Panics if a previous test thread poisoned the mock state.
    pub fn enqueue_generate<R>(&self, result: R) -> &Self
    where
        R: Into<MockGenerateResult>,
    {
        self.state
            .lock()
            .expect("mock state poisoned")
            .mocked_generate_results
            .push_back(result.into());
        self
    }

    /// Retrieve the tracked generate inputs accumulated so far.
    ///
    /// # Panics
    ///
    /// Panics if a previous test thread poisoned the mock state.
    pub fn tracked_generate_inputs(&self) -> Vec<LanguageModelInput> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .tracked_generate_inputs
            .clone()
    }

    /// Number of queued results not consumed yet.
    ///
    /// # Panics
    ///
    /// Panics if a previous test thread poisoned the mock state.
    pub fn pending_results(&self) -> usize {
        self.state
            .lock()
            .expect("mock state poisoned")
            .mocked_generate_results
            .len()
    }
}

#[async_trait::async_trait]
impl LanguageModel for MockLanguageModel {
    fn provider(&self) -> &'static str {
        self.provider
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    fn history_window(&self) -> Option<usize> {
        self.history_window
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        let next = {
            let mut state = self.state.lock().expect("mock state poisoned");
            state.tracked_generate_inputs.push(input);
            state.mocked_generate_results.pop_front()
        };

        match next {
            Some(MockGenerateResult::Response(response)) => Ok(response),
            Some(MockGenerateResult::Error(error)) => Err(error),
            Some(MockGenerateResult::Pending) => futures::future::pending().await,
            None => Err(LanguageModelError::Invariant(
                "mock",
                "no mocked generate results available".to_string(),
            )),
        }
    }
}
