use std::time::Duration;
use thiserror::Error;

/// Failures [`crate::AssistantClient::send_message`] hands back to the caller.
///
/// Provider outages never appear here: they are answered by the keyword
/// responder or an apology instead.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A newer message superseded this one, or the caller cancelled it. The
    /// caller is expected to drop it silently.
    #[error("The request was cancelled before the provider replied")]
    RequestCancelled,
    #[error("The provider did not reply within {0:?}")]
    TimedOut(Duration),
}

impl AssistantError {
    /// Whether the caller should discard the result without telling the user.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::RequestCancelled)
    }
}
