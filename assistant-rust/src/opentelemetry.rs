use opentelemetry::trace::Status;
use tracing::{info_span, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// How a turn was answered, recorded on the turn span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Provider,
    Fallback,
    Apology,
    Cancelled,
    TimedOut,
}

impl TurnOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Fallback => "fallback",
            Self::Apology => "apology",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
        }
    }
}

pub struct TurnSpan {
    span: Span,
}

impl TurnSpan {
    pub fn new(provider: &str, session_id: &str) -> Self {
        let span = info_span!("autofleet_assistant.send_message");
        span.set_attribute("gen_ai.operation.name", "chat");
        span.set_attribute("gen_ai.provider.name", provider.to_string());
        span.set_attribute("autofleet_assistant.session_id", session_id.to_string());
        Self { span }
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn on_outcome(&self, outcome: TurnOutcome, navigation_url: Option<&str>) {
        self.span
            .set_attribute("autofleet_assistant.outcome", outcome.as_str());
        if let Some(url) = navigation_url {
            self.span
                .set_attribute("autofleet_assistant.navigation_url", url.to_string());
        }
        match outcome {
            TurnOutcome::TimedOut => self.span.set_status(Status::error("provider timed out")),
            TurnOutcome::Apology => self
                .span
                .set_status(Status::error("provider request could not be built")),
            _ => {}
        }
    }
}
