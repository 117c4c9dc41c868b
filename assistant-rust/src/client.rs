use crate::{
    context::ConversationContext,
    fallback::KeywordResponder,
    instruction,
    opentelemetry::{TurnOutcome, TurnSpan},
    parser::{parse_reply, ParsedReply},
    sink::{InteractionRecord, InteractionSink},
    suggestions, AssistantError, AssistantParams, AssistantResponse, ChatMessage,
};
use autofleet_llm::{LanguageModel, LanguageModelError, LanguageModelInput, Message, ModelResponse};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_futures::Instrument;

/// Reported by [`AssistantClient::ai_provider`] when no provider is
/// configured.
pub const FALLBACK_PROVIDER: &str = "keyword-fallback";

pub const APOLOGY_MESSAGE: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

const DEFAULT_HISTORY_LIMIT: usize = 8;

struct InFlight {
    id: u64,
    token: CancellationToken,
}

struct DispatchState {
    context: ConversationContext,
    in_flight: Option<InFlight>,
    next_request_id: u64,
}

/// A user message already appended to the context, waiting for its reply.
struct Turn<'a> {
    id: u64,
    token: CancellationToken,
    history: Vec<ChatMessage>,
    _slot: SlotRelease<'a>,
}

/// Frees the in-flight slot when the turn ends, including when the
/// `send_message` future is dropped before the provider replies.
struct SlotRelease<'a> {
    state: &'a Mutex<DispatchState>,
    id: u64,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        release(&mut state, self.id);
    }
}

enum DispatchError {
    Cancelled,
    TimedOut(Duration),
    Model(LanguageModelError),
}

/// The chat widget's backend.
///
/// Holds one conversation and at most one outstanding provider request:
/// sending a new message cancels the previous one before the new user
/// message is appended, so a superseded request can never append a reply.
pub struct AssistantClient {
    model: Option<Arc<dyn LanguageModel>>,
    system_prompt: String,
    max_tokens: u32,
    temperature: f64,
    request_timeout: Option<Duration>,
    responder: KeywordResponder,
    sink: Arc<dyn InteractionSink>,
    state: Mutex<DispatchState>,
}

impl AssistantClient {
    #[must_use]
    pub fn new(params: AssistantParams) -> Self {
        Self {
            model: params.model,
            system_prompt: instruction::get_prompt(&params.instructions),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            request_timeout: params.request_timeout,
            responder: KeywordResponder,
            sink: params.interaction_sink,
            state: Mutex::new(DispatchState {
                context: ConversationContext::new(params.context_capacity),
                in_flight: None,
                next_request_id: 0,
            }),
        }
    }

    #[must_use]
    pub fn builder() -> AssistantParams {
        AssistantParams::new()
    }

    #[must_use]
    pub fn is_ai_available(&self) -> bool {
        self.model.is_some()
    }

    #[must_use]
    pub fn ai_provider(&self) -> &'static str {
        self.model
            .as_ref()
            .map_or(FALLBACK_PROVIDER, |model| model.provider())
    }

    #[must_use]
    pub fn session_id(&self) -> String {
        self.lock_state().context.session_id().to_string()
    }

    /// Snapshot of the transcript, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock_state().context.messages().cloned().collect()
    }

    #[must_use]
    pub fn last_navigation_url(&self) -> Option<String> {
        self.lock_state()
            .context
            .last_navigation_url()
            .map(str::to_string)
    }

    /// Drop the transcript and start a new session. An outstanding request
    /// is cancelled so its reply cannot land in the new session.
    pub fn clear_context(&self) {
        let mut state = self.lock_state();
        if let Some(in_flight) = state.in_flight.take() {
            in_flight.token.cancel();
        }
        state.context.reset();
        debug!(session_id = state.context.session_id(), "conversation context cleared");
    }

    /// Cancel the outstanding request, if any. Returns whether there was one.
    pub fn cancel_pending(&self) -> bool {
        match self.lock_state().in_flight.take() {
            Some(in_flight) => {
                in_flight.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Answer one user message.
    ///
    /// Provider failures are answered by the keyword responder, and requests
    /// that could not be built get an apology; both still produce `Ok`. The
    /// only errors are empty input, cancellation (by a newer message,
    /// [`Self::clear_context`], [`Self::cancel_pending`] or `cancellation`)
    /// and the configured timeout.
    pub async fn send_message(
        &self,
        text: &str,
        session_id: &str,
        cancellation: Option<CancellationToken>,
    ) -> Result<AssistantResponse, AssistantError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AssistantError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }

        let span = TurnSpan::new(self.ai_provider(), session_id);
        self.run_turn(text, session_id, cancellation, &span)
            .instrument(span.span())
            .await
    }

    async fn run_turn(
        &self,
        text: &str,
        session_id: &str,
        cancellation: Option<CancellationToken>,
        span: &TurnSpan,
    ) -> Result<AssistantResponse, AssistantError> {
        let token = cancellation
            .as_ref()
            .map_or_else(CancellationToken::new, CancellationToken::child_token);
        let turn = self.begin_turn(text, token);

        let Some(model) = &self.model else {
            let response = self.fallback_response(text);
            return self.complete_turn(
                turn,
                text,
                session_id,
                response,
                TurnOutcome::Fallback,
                span,
            );
        };

        debug!(
            provider = model.provider(),
            history = turn.history.len(),
            "dispatching message to provider"
        );
        let input = self.build_input(&turn.history, text);

        match self.dispatch(model.as_ref(), input, &turn.token).await {
            Ok(response) if response.text.trim().is_empty() => {
                warn!(
                    provider = model.provider(),
                    "provider returned empty text, using keyword responder"
                );
                let response = self.fallback_response(text);
                self.complete_turn(turn, text, session_id, response, TurnOutcome::Fallback, span)
            }
            Ok(response) => {
                let response = interpret_reply(&response.text);
                self.complete_turn(turn, text, session_id, response, TurnOutcome::Provider, span)
            }
            Err(DispatchError::Cancelled) => {
                span.on_outcome(TurnOutcome::Cancelled, None);
                debug!(request_id = turn.id, "request cancelled before the provider replied");
                Err(AssistantError::RequestCancelled)
            }
            Err(DispatchError::TimedOut(timeout)) => {
                span.on_outcome(TurnOutcome::TimedOut, None);
                warn!(
                    provider = model.provider(),
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "provider did not reply in time"
                );
                Err(AssistantError::TimedOut(timeout))
            }
            Err(DispatchError::Model(error)) if error.is_provider_failure() => {
                warn!(
                    provider = model.provider(),
                    error = %error,
                    "provider call failed, using keyword responder"
                );
                let response = self.fallback_response(text);
                self.complete_turn(turn, text, session_id, response, TurnOutcome::Fallback, span)
            }
            Err(DispatchError::Model(error)) => {
                warn!(
                    provider = model.provider(),
                    error = %error,
                    "provider request could not be built"
                );
                let response = AssistantResponse::error(APOLOGY_MESSAGE, suggestions::generic());
                self.complete_turn(turn, text, session_id, response, TurnOutcome::Apology, span)
            }
        }
    }

    /// Supersede the outstanding request and append the user message.
    fn begin_turn(&self, text: &str, token: CancellationToken) -> Turn<'_> {
        let history_limit = self.history_limit();
        let mut state = self.lock_state();

        if let Some(previous) = state.in_flight.take() {
            debug!(request_id = previous.id, "superseding outstanding request");
            previous.token.cancel();
        }

        let id = state.next_request_id;
        state.next_request_id = id.wrapping_add(1);
        state.in_flight = Some(InFlight {
            id,
            token: token.clone(),
        });

        let history = state.context.recent(history_limit);
        state.context.push(ChatMessage::user(text));

        Turn {
            id,
            token,
            history,
            _slot: SlotRelease {
                state: &self.state,
                id,
            },
        }
    }

    /// Append the reply unless the turn was cancelled meanwhile. The check
    /// and the append happen under the lock a superseding turn takes to
    /// cancel this one.
    fn complete_turn(
        &self,
        turn: Turn<'_>,
        user_text: &str,
        session_id: &str,
        response: AssistantResponse,
        outcome: TurnOutcome,
        span: &TurnSpan,
    ) -> Result<AssistantResponse, AssistantError> {
        {
            let mut state = self.lock_state();
            release(&mut state, turn.id);

            if turn.token.is_cancelled() {
                drop(state);
                span.on_outcome(TurnOutcome::Cancelled, None);
                debug!(request_id = turn.id, "reply discarded, request was cancelled");
                return Err(AssistantError::RequestCancelled);
            }

            if let Some(url) = &response.navigation_url {
                state.context.set_last_navigation_url(url.clone());
            }
            state
                .context
                .push(ChatMessage::assistant(response.message.clone()));
        }

        span.on_outcome(outcome, response.navigation_url.as_deref());
        self.sink.record(InteractionRecord {
            session_id: session_id.to_string(),
            user_message: user_text.to_string(),
            bot_response: response.message.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        });

        Ok(response)
    }

    async fn dispatch(
        &self,
        model: &dyn LanguageModel,
        input: LanguageModelInput,
        token: &CancellationToken,
    ) -> Result<ModelResponse, DispatchError> {
        let deadline = async {
            match self.request_timeout {
                Some(timeout) => {
                    tokio::time::sleep(timeout).await;
                    timeout
                }
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = token.cancelled() => Err(DispatchError::Cancelled),
            timeout = deadline => {
                token.cancel();
                Err(DispatchError::TimedOut(timeout))
            }
            result = model.generate(input) => result.map_err(DispatchError::Model),
        }
    }

    fn build_input(&self, history: &[ChatMessage], text: &str) -> LanguageModelInput {
        LanguageModelInput {
            system_prompt: Some(self.system_prompt.clone()),
            messages: history
                .iter()
                .map(Message::from)
                .chain(std::iter::once(Message::user(text)))
                .collect(),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }

    fn fallback_response(&self, text: &str) -> AssistantResponse {
        let last_navigation_url = self.last_navigation_url();
        self.responder.respond(text, last_navigation_url.as_deref())
    }

    fn history_limit(&self) -> usize {
        self.model
            .as_ref()
            .and_then(|model| model.history_window())
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    fn lock_state(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clear the in-flight slot if it still belongs to request `id`.
fn release(state: &mut DispatchState, id: u64) {
    if state
        .in_flight
        .as_ref()
        .is_some_and(|in_flight| in_flight.id == id)
    {
        state.in_flight = None;
    }
}

fn interpret_reply(raw: &str) -> AssistantResponse {
    match parse_reply(raw) {
        ParsedReply::Navigate { url, text } => {
            let suggestions = suggestions::for_destination(&url);
            AssistantResponse::navigation(text, url, suggestions)
        }
        ParsedReply::Text(text) => {
            let suggestions = suggestions::for_text(&text);
            AssistantResponse::text(text, suggestions)
        }
    }
}
