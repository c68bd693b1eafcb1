//! Rule-based follow-up material attached to every drafted response.

use rp_core::{FaqLink, Sentiment};

const BASE_ACTIONS: [&str; 2] = [
    "Review customer history and previous interactions",
    "Document the issue in customer support system",
];

pub const NEGATIVE_ACTIONS: [&str; 6] = [
    "Escalate to senior support team immediately",
    "Follow up within 24 hours via phone/email",
    "Offer appropriate compensation (refund/discount)",
    "Implement process improvements to prevent recurrence",
    "Monitor for follow-up response from customer",
    "Update customer service training based on feedback",
];

pub const POSITIVE_ACTIONS: [&str; 4] = [
    "Thank customer publicly and privately",
    "Share positive feedback with team",
    "Consider featuring in testimonials",
    "Monitor for follow-up questions",
];

pub const NEUTRAL_ACTIONS: [&str; 2] = [
    "Monitor for follow-up questions",
    "Provide additional resources if needed",
];

const COMPLAINT_ACTIONS: [&str; 2] = ["Schedule follow-up call", "Prepare compensation offer"];

const QUESTION_ACTIONS: [&str; 2] = [
    "Provide detailed documentation links",
    "Offer live chat support if needed",
];

/// Base actions, then the sentiment branch, then extras triggered by the custom
/// instructions. "complaint" wins over "question" when both appear.
pub fn action_checklist(sentiment: Sentiment, custom_instructions: Option<&str>) -> Vec<String> {
    let branch: &[&str] = match sentiment {
        Sentiment::Negative => &NEGATIVE_ACTIONS,
        Sentiment::Positive => &POSITIVE_ACTIONS,
        Sentiment::Neutral => &NEUTRAL_ACTIONS,
    };

    let instructions = custom_instructions.map(str::to_lowercase).unwrap_or_default();
    let extras: &[&str] = if instructions.contains("complaint") {
        &COMPLAINT_ACTIONS
    } else if instructions.contains("question") {
        &QUESTION_ACTIONS
    } else {
        &[]
    };

    BASE_ACTIONS
        .iter()
        .chain(branch)
        .chain(extras)
        .map(|action| action.to_string())
        .collect()
}

fn link(title: &str, url: &str, relevance_score: f32) -> FaqLink {
    FaqLink {
        title: title.to_string(),
        url: url.to_string(),
        relevance_score,
    }
}

/// Support resources: three for negative mentions, two otherwise.
pub fn faq_links(sentiment: Sentiment) -> Vec<FaqLink> {
    match sentiment {
        Sentiment::Negative => vec![
            link("Negative Review Response Guidelines", "/support/negative-reviews", 0.95),
            link("Customer Satisfaction Recovery", "/support/recovery", 0.88),
            link("Direct Customer Support", "/support/contact", 0.85),
        ],
        Sentiment::Positive | Sentiment::Neutral => vec![
            link("Customer Support Guidelines", "/support/guidelines", 0.85),
            link("Contact Support Team", "/support/contact", 0.72),
        ],
    }
}
