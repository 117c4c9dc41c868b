use serde::Serialize;
use tracing::{debug, info, warn};

/// One completed exchange, as stored by the backend transcript log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Receives every completed exchange. Implementations must not block and
/// must swallow their own failures: recording never affects the reply.
pub trait InteractionSink: Send + Sync {
    fn record(&self, record: InteractionRecord);
}

/// Emits each exchange as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl InteractionSink for TracingSink {
    fn record(&self, record: InteractionRecord) {
        info!(
            target: "autofleet_assistant::interactions",
            session_id = %record.session_id,
            user_message = %record.user_message,
            bot_response = %record.bot_response,
            timestamp = record.timestamp,
            "chat interaction"
        );
    }
}

/// Posts each exchange as JSON to a backend endpoint on a background task.
#[derive(Debug, Clone)]
pub struct HttpInteractionSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpInteractionSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl InteractionSink for HttpInteractionSink {
    fn record(&self, record: InteractionRecord) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                endpoint = %self.endpoint,
                "no tokio runtime available, interaction not logged"
            );
            return;
        };

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        runtime.spawn(async move {
            let result = client
                .post(&endpoint)
                .json(&record)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status);

            match result {
                Ok(_) => debug!(endpoint = %endpoint, "interaction logged"),
                Err(error) => warn!(
                    endpoint = %endpoint,
                    error = %error,
                    "failed to log interaction"
                ),
            }
        });
    }
}
