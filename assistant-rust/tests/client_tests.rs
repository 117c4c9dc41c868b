use autofleet_assistant::{
    AssistantClient, AssistantError, CancellationToken, InteractionRecord, InteractionSink,
    KeywordResponder, ResponseKind, Role, APOLOGY_MESSAGE, FALLBACK_PROVIDER, SYSTEM_PREAMBLE,
};
use autofleet_llm::{
    sdk_test::{MockGenerateResult, MockLanguageModel},
    LanguageModelError, Message,
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

const SESSION: &str = "session_test";

fn client_with(model: &Arc<MockLanguageModel>) -> AssistantClient {
    AssistantClient::builder().model(model.clone()).build()
}

fn navigate(url: &str) -> String {
    format!("{{\"action\": \"navigate\", \"url\": \"{url}\"}}")
}

async fn wait_for_dispatch(model: &MockLanguageModel, count: usize) {
    while model.tracked_generate_inputs().len() < count {
        tokio::task::yield_now().await;
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    records: Arc<Mutex<Vec<InteractionRecord>>>,
}

impl InteractionSink for RecordingSink {
    fn record(&self, record: InteractionRecord) {
        self.records.lock().unwrap().push(record);
    }
}

#[tokio::test]
async fn hello_without_provider_greets_without_navigation() {
    let client = AssistantClient::builder().build();
    assert!(!client.is_ai_available());
    assert_eq!(client.ai_provider(), FALLBACK_PROVIDER);

    let response = client
        .send_message("hello", SESSION, None)
        .await
        .expect("send succeeds");

    assert!(response.message.starts_with("Hello!"));
    assert_eq!(response.navigation_url, None);
    assert!((3..=4).contains(&response.suggestions.len()));
}

#[tokio::test]
async fn price_question_without_provider_returns_rate_table() {
    let client = AssistantClient::builder().build();

    let response = client
        .send_message("what are your prices", SESSION, None)
        .await
        .expect("send succeeds");

    assert!(response.message.contains("$25-35/day"));
    assert_eq!(response.kind, None);
    assert_eq!(response.navigation_url, None);
}

#[tokio::test]
async fn empty_input_is_rejected_without_touching_context() {
    let client = AssistantClient::builder().build();
    client
        .send_message("hi", SESSION, None)
        .await
        .expect("send succeeds");
    let before = client.messages();

    for input in ["", "   ", "\n\t"] {
        let error = client
            .send_message(input, SESSION, None)
            .await
            .expect_err("empty input is rejected");
        assert!(matches!(error, AssistantError::InvalidInput(_)));
    }

    assert_eq!(client.messages(), before);
}

#[tokio::test]
async fn context_never_exceeds_ten_messages() {
    let client = AssistantClient::builder().build();

    for index in 0..12 {
        client
            .send_message(&format!("question {index}"), SESSION, None)
            .await
            .expect("send succeeds");
        assert!(client.messages().len() <= 10);
    }

    let messages = client.messages();
    assert_eq!(messages.len(), 10);
    assert_eq!(messages[0].content, "question 7");
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[9].role, Role::Assistant);
}

#[tokio::test]
async fn fallback_is_deterministic() {
    let first = AssistantClient::builder().build();
    let second = AssistantClient::builder().build();

    for input in ["I want to book a car", "show my bookings", "help!", "tell me a joke"] {
        let a = first.send_message(input, SESSION, None).await.expect("send succeeds");
        let b = second.send_message(input, SESSION, None).await.expect("send succeeds");
        assert_eq!(a, b, "input: {input}");
    }
}

#[tokio::test]
async fn navigation_action_is_stripped_from_provider_reply() {
    let model = Arc::new(MockLanguageModel::new().with_provider("openai"));
    model.enqueue_generate(MockGenerateResult::text(format!(
        "Sure! {} Browse our fleet.",
        navigate("/vehicle")
    )));
    let client = client_with(&model);
    assert!(client.is_ai_available());
    assert_eq!(client.ai_provider(), "openai");

    let response = client
        .send_message("show me cars", SESSION, None)
        .await
        .expect("send succeeds");

    assert_eq!(response.kind, Some(ResponseKind::Navigation));
    assert_eq!(response.navigation_url.as_deref(), Some("/vehicle"));
    assert_eq!(response.message, "Sure! Browse our fleet.");
    assert!(!response.message.contains("navigate"));
    assert!((3..=4).contains(&response.suggestions.len()));
    assert_eq!(client.last_navigation_url().as_deref(), Some("/vehicle"));

    let messages = client.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "Sure! Browse our fleet.");
}

#[tokio::test]
async fn plain_provider_reply_is_passed_through() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(MockGenerateResult::text(
        "You can cancel a booking up to 24 hours before pickup.",
    ));
    let client = client_with(&model);

    let response = client
        .send_message("can I cancel?", SESSION, None)
        .await
        .expect("send succeeds");

    assert_eq!(
        response.message,
        "You can cancel a booking up to 24 hours before pickup."
    );
    assert_eq!(response.kind, None);
    assert_eq!(response.navigation_url, None);
    assert!((3..=4).contains(&response.suggestions.len()));
}

#[tokio::test]
async fn provider_request_carries_preamble_history_and_new_message() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_generate(MockGenerateResult::text("Hi there!"))
        .enqueue_generate(MockGenerateResult::text("We have SUVs."));
    let client = AssistantClient::builder()
        .model(model.clone())
        .add_instruction("Answer in English.")
        .build();

    client.send_message("hi", SESSION, None).await.expect("send succeeds");
    client
        .send_message("any SUVs?", SESSION, None)
        .await
        .expect("send succeeds");

    let inputs = model.tracked_generate_inputs();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].messages, vec![Message::user("hi")]);
    assert_eq!(
        inputs[1].messages,
        vec![
            Message::user("hi"),
            Message::assistant("Hi there!"),
            Message::user("any SUVs?"),
        ]
    );

    let system_prompt = inputs[1].system_prompt.as_deref().expect("system prompt set");
    assert!(system_prompt.starts_with(SYSTEM_PREAMBLE));
    assert!(system_prompt.ends_with("\nAnswer in English."));
    assert_eq!(inputs[1].max_tokens, Some(500));
    assert_eq!(inputs[1].temperature, Some(0.7));
}

#[tokio::test]
async fn provider_failure_falls_back_for_that_call_only() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_generate(MockGenerateResult::error(LanguageModelError::Invariant(
            "mock",
            "malformed envelope".to_string(),
        )))
        .enqueue_generate(MockGenerateResult::text("Back online."));
    let client = client_with(&model);

    let response = client
        .send_message("what are your prices", SESSION, None)
        .await
        .expect("send succeeds");
    assert_eq!(
        response,
        KeywordResponder.respond("what are your prices", None)
    );

    let response = client
        .send_message("still there?", SESSION, None)
        .await
        .expect("send succeeds");
    assert_eq!(response.message, "Back online.");
    assert_eq!(model.tracked_generate_inputs().len(), 2);
    assert_eq!(client.messages().len(), 4);
}

#[tokio::test]
async fn empty_provider_text_falls_back() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(MockGenerateResult::text("   "));
    let client = client_with(&model);

    let response = client
        .send_message("hello", SESSION, None)
        .await
        .expect("send succeeds");

    assert!(response.message.starts_with("Hello!"));
}

#[tokio::test]
async fn local_request_failure_returns_apology() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(MockGenerateResult::error(LanguageModelError::InvalidInput(
        "bad header".to_string(),
    )));
    let client = client_with(&model);

    let response = client
        .send_message("hello", SESSION, None)
        .await
        .expect("send succeeds");

    assert_eq!(response.message, APOLOGY_MESSAGE);
    assert_eq!(response.kind, Some(ResponseKind::Error));
    assert!((3..=4).contains(&response.suggestions.len()));

    let messages = client.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, APOLOGY_MESSAGE);
}

#[tokio::test]
async fn superseded_request_is_cancelled_silently() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_generate(MockGenerateResult::Pending)
        .enqueue_generate(MockGenerateResult::text("Reply to the second message."));
    let client = Arc::new(client_with(&model));

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.send_message("first", SESSION, None).await }
    });
    wait_for_dispatch(&model, 1).await;

    let second = client
        .send_message("second", SESSION, None)
        .await
        .expect("second send succeeds");
    assert_eq!(second.message, "Reply to the second message.");

    let first = first.await.expect("task joins");
    assert!(matches!(first, Err(AssistantError::RequestCancelled)));

    let contents: Vec<_> = client
        .messages()
        .into_iter()
        .map(|message| (message.role, message.content))
        .collect();
    assert_eq!(
        contents,
        vec![
            (Role::User, "first".to_string()),
            (Role::User, "second".to_string()),
            (Role::Assistant, "Reply to the second message.".to_string()),
        ]
    );
}

#[tokio::test]
async fn caller_cancellation_appends_nothing() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(MockGenerateResult::Pending);
    let client = Arc::new(client_with(&model));
    let token = CancellationToken::new();

    let pending = tokio::spawn({
        let client = client.clone();
        let token = token.clone();
        async move { client.send_message("hello", SESSION, Some(token)).await }
    });
    wait_for_dispatch(&model, 1).await;
    token.cancel();

    let result = pending.await.expect("task joins");
    let error = result.expect_err("request is cancelled");
    assert!(error.is_silent());

    let messages = client.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
}

#[tokio::test]
async fn cancel_pending_reports_whether_a_request_was_outstanding() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(MockGenerateResult::Pending);
    let client = Arc::new(client_with(&model));
    assert!(!client.cancel_pending());

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.send_message("hello", SESSION, None).await }
    });
    wait_for_dispatch(&model, 1).await;

    assert!(client.cancel_pending());
    let result = pending.await.expect("task joins");
    assert!(matches!(result, Err(AssistantError::RequestCancelled)));
}

#[tokio::test]
async fn dropped_send_message_frees_the_request_slot() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_generate(MockGenerateResult::Pending)
        .enqueue_generate(MockGenerateResult::text("Back again."));
    let client = client_with(&model);

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        client.send_message("hello", SESSION, None),
    )
    .await;
    assert!(abandoned.is_err(), "provider never replies");

    assert!(!client.cancel_pending(), "no request is outstanding");
    assert_eq!(client.messages().len(), 1);

    let response = client
        .send_message("are you there", SESSION, None)
        .await
        .expect("next send succeeds");
    assert_eq!(response.message, "Back again.");
    assert_eq!(client.messages().len(), 3);
}

#[tokio::test]
async fn slow_provider_times_out() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(MockGenerateResult::Pending);
    let client = AssistantClient::builder()
        .model(model.clone())
        .request_timeout(Duration::from_millis(20))
        .build();

    let error = client
        .send_message("hello", SESSION, None)
        .await
        .expect_err("request times out");

    assert!(matches!(
        error,
        AssistantError::TimedOut(timeout) if timeout == Duration::from_millis(20)
    ));
    assert!(!error.is_silent());
    assert_eq!(client.messages().len(), 1);
}

#[tokio::test]
async fn clear_context_starts_fresh_session() {
    let model = Arc::new(MockLanguageModel::new());
    for index in 0..6 {
        model.enqueue_generate(MockGenerateResult::text(format!("answer {index}")));
    }
    let client = client_with(&model);

    for index in 0..5 {
        client
            .send_message(&format!("question {index}"), SESSION, None)
            .await
            .expect("send succeeds");
    }
    let old_session = client.session_id();

    client.clear_context();
    assert!(client.messages().is_empty());
    assert_eq!(client.last_navigation_url(), None);
    assert_ne!(client.session_id(), old_session);

    client
        .send_message("new question", SESSION, None)
        .await
        .expect("send succeeds");

    let inputs = model.tracked_generate_inputs();
    let last = inputs.last().expect("request dispatched");
    assert_eq!(last.messages, vec![Message::user("new question")]);
}

#[tokio::test]
async fn history_window_follows_the_model() {
    let cases = [
        ("openai", None, 8),
        ("anthropic", None, 8),
        ("google", None, 8),
        ("google", Some(6), 6),
    ];
    for (provider, window, expected_history) in cases {
        let mut model = MockLanguageModel::new().with_provider(provider);
        if let Some(window) = window {
            model = model.with_history_window(window);
        }
        let model = Arc::new(model);
        for index in 0..7 {
            model.enqueue_generate(MockGenerateResult::text(format!("answer {index}")));
        }
        let client = client_with(&model);

        for index in 0..7 {
            client
                .send_message(&format!("question {index}"), SESSION, None)
                .await
                .expect("send succeeds");
        }

        let inputs = model.tracked_generate_inputs();
        let last = inputs.last().expect("request dispatched");
        assert_eq!(
            last.messages.len(),
            expected_history + 1,
            "provider: {provider}, window: {window:?}"
        );
        assert_eq!(last.messages.last(), Some(&Message::user("question 6")));
    }
}

#[tokio::test]
async fn every_completed_exchange_is_recorded() {
    let sink = RecordingSink::default();
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(MockGenerateResult::Pending);
    let client = Arc::new(
        AssistantClient::builder()
            .model(model.clone())
            .interaction_sink(sink.clone())
            .build(),
    );

    let cancelled = tokio::spawn({
        let client = client.clone();
        async move { client.send_message("first", "session-abc", None).await }
    });
    wait_for_dispatch(&model, 1).await;
    model.enqueue_generate(MockGenerateResult::text("Hello!"));
    client
        .send_message("hello", "session-abc", None)
        .await
        .expect("send succeeds");
    assert!(cancelled.await.expect("task joins").is_err());

    let records = sink.records.lock().unwrap().clone();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].session_id, "session-abc");
    assert_eq!(records[0].user_message, "hello");
    assert_eq!(records[0].bot_response, "Hello!");
}

#[tokio::test]
async fn response_serializes_for_the_widget() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(MockGenerateResult::text(navigate("/bookings")));
    let client = client_with(&model);

    let response = client
        .send_message("my bookings", SESSION, None)
        .await
        .expect("send succeeds");
    let value = serde_json::to_value(&response).expect("serializes");

    assert_eq!(value["type"], "navigation");
    assert_eq!(value["navigationUrl"], "/bookings");
    assert_eq!(value["message"], "I'll take you there now.");
    assert!(value["suggestions"].is_array());

    let plain = KeywordResponder.respond("what are your prices", None);
    let value = serde_json::to_value(&plain).expect("serializes");
    assert!(value.get("type").is_none());
    assert!(value.get("navigationUrl").is_none());
}
