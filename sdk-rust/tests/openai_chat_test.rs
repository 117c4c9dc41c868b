use autofleet_llm::{
    openai::{OpenAIChatModel, OpenAIChatModelOptions},
    LanguageModel, LanguageModelError, LanguageModelInput, Message, ModelUsage,
};
use mockito::Matcher;
use serde_json::json;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

fn openai_model(server: &mockito::ServerGuard) -> OpenAIChatModel {
    OpenAIChatModel::new(
        "gpt-3.5-turbo",
        OpenAIChatModelOptions {
            endpoint: Some(format!("{}{COMPLETIONS_PATH}", server.url())),
            api_key: "sk-test".to_string(),
            ..Default::default()
        },
    )
}

fn conversation_input() -> LanguageModelInput {
    LanguageModelInput {
        system_prompt: Some("You are the AutoFleet Hub assistant.".to_string()),
        messages: vec![
            Message::user("hi"),
            Message::assistant("Hello! How can I help?"),
            Message::user("show me SUVs"),
        ],
        max_tokens: Some(500),
        temperature: Some(0.7),
    }
}

#[tokio::test]
async fn generate_sends_system_message_first_and_reads_first_choice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", COMPLETIONS_PATH)
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::Json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                { "role": "system", "content": "You are the AutoFleet Hub assistant." },
                { "role": "user", "content": "hi" },
                { "role": "assistant", "content": "Hello! How can I help?" },
                { "role": "user", "content": "show me SUVs" }
            ],
            "max_tokens": 500,
            "temperature": 0.7,
            "stream": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "choices": [
                    {
                        "index": 0,
                        "message": { "role": "assistant", "content": "Here are our SUVs." },
                        "finish_reason": "stop"
                    },
                    {
                        "index": 1,
                        "message": { "role": "assistant", "content": "ignored" },
                        "finish_reason": "stop"
                    }
                ],
                "usage": { "prompt_tokens": 42, "completion_tokens": 6, "total_tokens": 48 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = openai_model(&server)
        .generate(conversation_input())
        .await
        .expect("generate succeeds");

    mock.assert_async().await;
    assert_eq!(response.text, "Here are our SUVs.");
    assert_eq!(
        response.usage,
        Some(ModelUsage {
            input_tokens: 42,
            output_tokens: 6,
        })
    );
}

#[tokio::test]
async fn generate_reports_server_errors_as_status_code() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(503)
        .with_body("upstream overloaded")
        .create_async()
        .await;

    let error = openai_model(&server)
        .generate(conversation_input())
        .await
        .expect_err("generate fails");

    match error {
        LanguageModelError::StatusCode(status, body) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "upstream overloaded");
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[tokio::test]
async fn generate_rejects_response_without_choices() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "choices": [] }).to_string())
        .create_async()
        .await;

    let error = openai_model(&server)
        .generate(conversation_input())
        .await
        .expect_err("generate fails");

    assert!(matches!(error, LanguageModelError::Invariant("openai", _)));
    assert!(error.is_provider_failure());
}

#[tokio::test]
async fn generate_rejects_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let error = openai_model(&server)
        .generate(conversation_input())
        .await
        .expect_err("generate fails");

    assert!(matches!(error, LanguageModelError::Invariant("openai", _)));
}

#[tokio::test]
async fn generate_surfaces_refusal() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [
                    { "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let error = openai_model(&server)
        .generate(conversation_input())
        .await
        .expect_err("generate fails");

    match error {
        LanguageModelError::Refusal(refusal) => assert_eq!(refusal, "I can't help with that."),
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[tokio::test]
async fn generate_fails_locally_for_unencodable_api_key() {
    let model = OpenAIChatModel::new(
        "gpt-3.5-turbo",
        OpenAIChatModelOptions {
            endpoint: Some("http://127.0.0.1:9/v1/chat/completions".to_string()),
            api_key: "bad\nkey".to_string(),
            ..Default::default()
        },
    );

    let error = model
        .generate(conversation_input())
        .await
        .expect_err("generate fails");

    assert!(matches!(error, LanguageModelError::InvalidInput(_)));
    assert!(!error.is_provider_failure());
}
