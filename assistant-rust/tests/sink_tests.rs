use autofleet_assistant::{
    AssistantClient, HttpInteractionSink, InteractionRecord, InteractionSink,
};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

async fn wait_until_matched(mock: &mockito::Mock) -> bool {
    for _ in 0..100 {
        if mock.matched_async().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn http_sink_posts_camel_case_record() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat/log")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "sessionId": "session_1_abc",
            "userMessage": "hello",
            "botResponse": "Hi!",
            "timestamp": 1_700_000_000_000_i64
        })))
        .with_status(201)
        .create_async()
        .await;

    let sink = HttpInteractionSink::new(format!("{}/api/chat/log", server.url()));
    sink.record(InteractionRecord {
        session_id: "session_1_abc".to_string(),
        user_message: "hello".to_string(),
        bot_response: "Hi!".to_string(),
        timestamp: 1_700_000_000_000,
    });

    assert!(wait_until_matched(&mock).await, "interaction was not posted");
}

#[tokio::test]
async fn http_sink_failure_does_not_affect_the_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat/log")
        .match_body(Matcher::PartialJson(json!({
            "sessionId": "session-xyz",
            "userMessage": "what are your prices"
        })))
        .with_status(500)
        .create_async()
        .await;

    let client = AssistantClient::builder()
        .interaction_sink(HttpInteractionSink::new(format!(
            "{}/api/chat/log",
            server.url()
        )))
        .build();

    let response = client
        .send_message("what are your prices", "session-xyz", None)
        .await
        .expect("send succeeds");

    assert!(response.message.contains("$25-35/day"));
    assert!(wait_until_matched(&mock).await, "interaction was not posted");
}

#[test]
fn http_sink_outside_runtime_is_a_no_op() {
    let sink = HttpInteractionSink::new("http://127.0.0.1:9/api/chat/log");
    sink.record(InteractionRecord {
        session_id: "session".to_string(),
        user_message: "hello".to_string(),
        bot_response: "Hi!".to_string(),
        timestamp: 0,
    });
}
