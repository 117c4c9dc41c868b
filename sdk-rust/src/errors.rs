use thiserror::Error;

#[derive(Error, Debug)]
pub enum LanguageModelError {
    /// The request could not be built locally (e.g. an API key that is not a
    /// valid header value). Nothing was sent to the provider.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the provider failed before a response was read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The provider answered with a non-2xx status code.
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The response envelope did not have the expected shape. (e.g. no
    /// choices returned in a chat completion)
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
    /// The model refused to process the input.
    #[error("Refusal: {0}")]
    Refusal(String),
}

impl LanguageModelError {
    /// Whether the failure happened on the provider side of the wire, as
    /// opposed to while the request was being constructed.
    #[must_use]
    pub fn is_provider_failure(&self) -> bool {
        !matches!(self, Self::InvalidInput(_))
    }
}

pub type LanguageModelResult<T> = Result<T, LanguageModelError>;
