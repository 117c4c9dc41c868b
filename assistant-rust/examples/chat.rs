use autofleet_assistant::{AssistantError, AssistantParams, HttpInteractionSink};
use autofleet_llm::ProviderCredentials;
use dotenvy::dotenv;
use std::{env, error::Error, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut params = AssistantParams::from_credentials(&ProviderCredentials::from_env())
        .request_timeout(Duration::from_secs(30));
    if let Ok(endpoint) = env::var("AUTOFLEET_CHAT_LOG_URL") {
        params = params.interaction_sink(HttpInteractionSink::new(endpoint));
    }
    let client = params.build();

    println!(
        "AutoFleet Hub assistant ({}). Type /clear to start over, /quit to exit.",
        client.ai_provider()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/clear" => {
                client.clear_context();
                println!("(conversation cleared)");
                continue;
            }
            _ => {}
        }

        let session_id = client.session_id();
        match client.send_message(&line, &session_id, None).await {
            Ok(response) => {
                println!("{}", response.message);
                if let Some(url) = &response.navigation_url {
                    println!("  -> navigate to {url}");
                }
                if !response.suggestions.is_empty() {
                    println!("  suggestions: {}", response.suggestions.join(" | "));
                }
            }
            Err(AssistantError::InvalidInput(_)) => {}
            Err(error) if error.is_silent() => {}
            Err(error) => println!("({error})"),
        }
    }

    Ok(())
}
