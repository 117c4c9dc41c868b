//! The AutoFleet Hub chat assistant.
//!
//! [`AssistantClient`] keeps a bounded transcript, sends each user message to
//! the configured language model together with the recent history, turns
//! navigation actions in the reply into [`AssistantResponse::navigation_url`]
//! and answers from a keyword table whenever no model is configured or the
//! model call fails.

mod client;
mod context;
mod errors;
mod fallback;
mod instruction;
mod opentelemetry;
mod params;
mod parser;
mod sink;
pub mod suggestions;
mod types;

pub use client::{AssistantClient, APOLOGY_MESSAGE, FALLBACK_PROVIDER};
pub use context::{generate_session_id, ConversationContext, DEFAULT_CONTEXT_CAPACITY};
pub use errors::AssistantError;
pub use fallback::{FallbackIntent, KeywordResponder, RATE_TABLE};
pub use instruction::SYSTEM_PREAMBLE;
pub use params::AssistantParams;
pub use parser::{parse_reply, ParsedReply, DEFAULT_NAVIGATION_TEXT};
pub use sink::{HttpInteractionSink, InteractionRecord, InteractionSink, TracingSink};
pub use types::*;

pub use tokio_util::sync::CancellationToken;
