use crate::{suggestions, AssistantResponse};
use regex::Regex;
use std::sync::LazyLock;

const RENTAL_PHRASES: &[&str] = &[
    "want to rent",
    "want to book",
    "like to rent",
    "like to book",
    "need to rent",
    "need a car",
    "rent a car",
    "book a car",
    "rent a vehicle",
    "book a vehicle",
    "make a booking",
    "make a reservation",
];
const VEHICLE_WORDS: &[&str] = &["vehicle", "car", "browse", "fleet", "suv", "sedan"];
const BOOKING_WORDS: &[&str] = &["booking", "reservation", "reserved", "my rental"];
const PRICING_WORDS: &[&str] = &[
    "price",
    "pricing",
    "cost",
    "how much",
    "rates",
    "fee",
    "cheap",
    "expensive",
];
const SUPPORT_WORDS: &[&str] = &["help", "support", "contact", "problem", "issue", "complaint"];

/// Whole words only, so "hi" does not fire inside "vehicle".
static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(hi|hello|hey|howdy|greetings|good (morning|afternoon|evening))\b")
        .expect("Invalid greeting regex")
});

pub const RATE_TABLE: &str = "Our daily rates depend on the vehicle category:\n\
- Economy: $25-35/day\n\
- Compact: $35-45/day\n\
- SUV: $55-75/day\n\
- Luxury: $85-150/day\n\
Weekly rentals get a discount. Would you like to browse vehicles?";

/// The canned answer families, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackIntent {
    Rental,
    Greeting,
    Vehicles,
    Bookings,
    Pricing,
    Support,
    General,
}

impl FallbackIntent {
    /// Classify lowercased input. First matching rule wins.
    #[must_use]
    pub fn classify(input: &str) -> Self {
        let input = input.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|word| input.contains(word));

        if mentions(RENTAL_PHRASES) {
            Self::Rental
        } else if GREETING.is_match(&input) {
            Self::Greeting
        } else if mentions(VEHICLE_WORDS) {
            Self::Vehicles
        } else if mentions(BOOKING_WORDS) {
            Self::Bookings
        } else if mentions(PRICING_WORDS) {
            Self::Pricing
        } else if mentions(SUPPORT_WORDS) {
            Self::Support
        } else {
            Self::General
        }
    }
}

/// Deterministic replies used when no provider is configured or the provider
/// call failed. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordResponder;

impl KeywordResponder {
    /// `last_navigation_url` only shapes the suggestions of the general
    /// answer.
    #[must_use]
    pub fn respond(&self, input: &str, last_navigation_url: Option<&str>) -> AssistantResponse {
        match FallbackIntent::classify(input) {
            FallbackIntent::Rental => AssistantResponse::navigation(
                "Great choice! Let me take you to our vehicle collection, where you can pick a \
                 car and book it in a few steps.",
                "/vehicle",
                owned(&[
                    "Show me SUVs",
                    "What are your prices?",
                    "What documents do I need?",
                    "How does insurance work?",
                ]),
            ),
            FallbackIntent::Greeting => AssistantResponse::text(
                "Hello! Welcome to AutoFleet Hub. I can help you find a car, manage your \
                 bookings or answer questions about pricing. What would you like to do?",
                suggestions::generic(),
            ),
            FallbackIntent::Vehicles => AssistantResponse::navigation(
                "Here's our vehicle collection. You can filter by type, price and availability.",
                "/vehicle",
                suggestions::for_destination("/vehicle"),
            ),
            FallbackIntent::Bookings => AssistantResponse::navigation(
                "Let me take you to your bookings, where you can view, modify or cancel \
                 reservations.",
                "/bookings",
                suggestions::for_destination("/bookings"),
            ),
            FallbackIntent::Pricing => {
                AssistantResponse::text(RATE_TABLE, suggestions::for_text("price"))
            }
            FallbackIntent::Support => AssistantResponse::navigation(
                "I'll take you to our support page, where our team can help with any issue.",
                "/support",
                suggestions::for_destination("/support"),
            ),
            FallbackIntent::General => AssistantResponse::text(
                "I'm here to help with vehicle rentals, bookings, pricing and support. What can \
                 I do for you?",
                last_navigation_url.map_or_else(suggestions::generic, suggestions::for_destination),
            ),
        }
    }
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}
