use crate::{LanguageModelInput, LanguageModelResult, ModelResponse};

/// A text generation backend. One implementation exists per provider wire
/// format; callers only ever see this trait.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> &'static str;
    fn model_id(&self) -> String;

    /// How many earlier messages this backend should be sent alongside the
    /// new one, when it needs a narrower window than the caller's default.
    fn history_window(&self) -> Option<usize> {
        None
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse>;
}
