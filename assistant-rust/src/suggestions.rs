//! Follow-up suggestion chips shown under a reply.

const GENERIC: &[&str] = &[
    "Browse vehicles",
    "Check my bookings",
    "What are your prices?",
    "Contact support",
];

/// Keyed by the first path segment of a navigation URL.
const DESTINATIONS: &[(&str, &[&str])] = &[
    (
        "vehicle",
        &[
            "Show me SUVs",
            "What are your prices?",
            "How do I book a car?",
            "Do you have luxury cars?",
        ],
    ),
    (
        "bookings",
        &[
            "How do I cancel a booking?",
            "Can I modify my booking?",
            "Book another car",
            "Contact support",
        ],
    ),
    (
        "support",
        &[
            "How do I cancel a booking?",
            "What documents do I need?",
            "Browse vehicles",
        ],
    ),
    (
        "dashboard",
        &[
            "How do I list a vehicle?",
            "Show my earnings",
            "View my bookings",
            "Contact support",
        ],
    ),
    (
        "profile",
        &[
            "Update my details",
            "View my bookings",
            "Browse vehicles",
        ],
    ),
];

/// Checked in order; the first topic with a keyword in the text wins.
const TOPICS: &[(&[&str], &[&str])] = &[
    (
        &["price", "cost"],
        &[
            "Show me economy cars",
            "Do you offer weekly rates?",
            "Browse vehicles",
            "What's included in the price?",
        ],
    ),
    (
        &["book", "rent"],
        &[
            "Browse available cars",
            "What documents do I need?",
            "How do I pay?",
        ],
    ),
    (
        &["cancel", "modify"],
        &[
            "View my bookings",
            "What is the cancellation policy?",
            "Contact support",
        ],
    ),
];

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

#[must_use]
pub fn generic() -> Vec<String> {
    owned(GENERIC)
}

/// Suggestions for the page a reply navigates to. Query strings, fragments
/// and sub-paths are ignored, so `/vehicle/42?from=chat` maps like
/// `/vehicle`.
#[must_use]
pub fn for_destination(url: &str) -> Vec<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let section = path
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();

    DESTINATIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(section))
        .map_or_else(generic, |(_, list)| owned(list))
}

/// Suggestions for a reply without navigation, picked by topic keywords in
/// the reply text.
#[must_use]
pub fn for_text(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    TOPICS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map_or_else(generic, |(_, list)| owned(list))
}
