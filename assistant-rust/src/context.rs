use crate::types::ChatMessage;
use rand::Rng;
use std::collections::VecDeque;

pub const DEFAULT_CONTEXT_CAPACITY: usize = 10;
const SESSION_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The transcript of one chat session, bounded to `capacity` messages.
/// Appending past the bound drops the oldest messages.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
    last_navigation_url: Option<String>,
    session_id: String,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_CAPACITY)
    }
}

impl ConversationContext {
    /// A capacity of zero is raised to one so the latest message is always
    /// kept.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity + 1),
            capacity,
            last_navigation_url: None,
            session_id: generate_session_id(),
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The last `limit` messages, oldest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<ChatMessage> {
        let skip = self.messages.len().saturating_sub(limit);
        self.messages.iter().skip(skip).cloned().collect()
    }

    #[must_use]
    pub fn last_navigation_url(&self) -> Option<&str> {
        self.last_navigation_url.as_deref()
    }

    pub fn set_last_navigation_url(&mut self, url: impl Into<String>) {
        self.last_navigation_url = Some(url.into());
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Forget every message and start a new session.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.last_navigation_url = None;
        self.session_id = generate_session_id();
    }
}

/// `session_<epoch millis>_<9 base-36 chars>`
#[must_use]
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SESSION_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("session_{}_{suffix}", chrono::Utc::now().timestamp_millis())
}
