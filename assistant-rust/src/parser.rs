use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Shown when a reply consists of nothing but a navigation action.
pub const DEFAULT_NAVIGATION_TEXT: &str = "I'll take you there now.";

/// `{"action": "navigate", "url": "<path>"}` with any whitespace between
/// tokens, plus the whitespace around the object itself.
static NAVIGATION_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s*)\{\s*"action"\s*:\s*"navigate"\s*,\s*"url"\s*:\s*"([^"]+)"\s*\}(\s*)"#)
        .expect("Invalid navigation action regex")
});

/// Generated text with any navigation action pulled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    Text(String),
    Navigate { url: String, text: String },
}

impl ParsedReply {
    /// The text to display, with the action removed.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Navigate { text, .. } => text,
        }
    }

    #[must_use]
    pub fn navigation_url(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Navigate { url, .. } => Some(url),
        }
    }
}

/// Look for a navigation action in model output.
///
/// The first action wins. Every action is removed from the display text.
/// A removal leaves the strongest break it swallowed: a blank line, a line
/// break, or a single space. Text without an action is returned unchanged.
#[must_use]
pub fn parse_reply(raw: &str) -> ParsedReply {
    let Some(captures) = NAVIGATION_ACTION.captures(raw) else {
        return ParsedReply::Text(raw.to_string());
    };
    let url = captures[2].trim().to_string();

    let stripped = NAVIGATION_ACTION.replace_all(raw, |captures: &Captures<'_>| {
        let around = [&captures[1], &captures[3]];
        if around.iter().any(|space| space.contains("\n\n")) {
            "\n\n"
        } else if around.iter().any(|space| space.contains('\n')) {
            "\n"
        } else {
            " "
        }
    });
    let text = match stripped.trim() {
        "" => DEFAULT_NAVIGATION_TEXT.to_string(),
        text => text.to_string(),
    };

    ParsedReply::Navigate { url, text }
}
