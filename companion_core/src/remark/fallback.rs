//! Canned remarks shown whenever generation fails.

/// Every failed generation is replaced by one of these, chosen uniformly.
pub const FALLBACK_PHRASES: [&str; 8] = [
    "Meow?",
    "Woof!",
    "Hmm...",
    "Where are we going?",
    "I'm hungry.",
    "*Sniff sniff*",
    "Wait for me!",
    "So fast!",
];

pub fn pick_fallback(rng: &mut fastrand::Rng) -> &'static str {
    FALLBACK_PHRASES[rng.usize(..FALLBACK_PHRASES.len())]
}

pub fn is_fallback(text: &str) -> bool {
    FALLBACK_PHRASES.contains(&text)
}
