//! Keyword-count sentiment heuristic.
//!
//! Matching is plain substring search on the lower-cased text, so "bad" also hits
//! "badge". Each keyword counts once no matter how often it appears.

use rp_core::Sentiment;

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "terrible",
    "awful",
    "horrible",
    "disappointed",
    "disgusting",
    "hate",
    "worst",
    "poor",
    "bad",
    "sucks",
    "pathetic",
    "useless",
    "waste",
    "ripoff",
    "scam",
    "angry",
    "frustrated",
    "annoyed",
    "upset",
    "furious",
    "outraged",
    "disgusted",
    "never again",
    "avoid",
    "stay away",
    "beware",
    "warning",
    "complaint",
    "broken",
    "defective",
    "faulty",
    "malfunction",
    "error",
    "bug",
    "glitch",
    "slow",
    "late",
    "delayed",
    "incompetent",
    "unprofessional",
    "rude",
    "ignorant",
];

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "excellent",
    "amazing",
    "wonderful",
    "fantastic",
    "great",
    "love",
    "perfect",
    "outstanding",
    "brilliant",
    "superb",
    "exceptional",
    "marvelous",
    "delightful",
    "happy",
    "satisfied",
    "pleased",
    "impressed",
    "recommend",
    "best",
    "awesome",
    "quick",
    "fast",
    "efficient",
    "professional",
    "helpful",
    "friendly",
    "kind",
];

fn hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

/// Classifies `text` by comparing negative and positive keyword hits. Ties are neutral.
pub fn classify(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let negative = hits(&lower, NEGATIVE_KEYWORDS);
    let positive = hits(&lower, POSITIVE_KEYWORDS);

    if negative > positive && negative > 0 {
        Sentiment::Negative
    } else if positive > negative && positive > 0 {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}
