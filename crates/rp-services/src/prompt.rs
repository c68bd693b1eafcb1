//! Response prompt construction.
//!
//! The prompt is a pure function of the request: same request, same string.

use once_cell::sync::Lazy;
use regex::Regex;
use rp_core::{AppError, ResponseLanguage, ResponseRequest, ResponseStyle, Result, Sentiment};

use crate::sentiment::classify;

/// Tone guides, one per (style, language) pair.
const TONE_GUIDES: &[(ResponseStyle, ResponseLanguage, &str)] = &[
    (
        ResponseStyle::Official,
        ResponseLanguage::En,
        "Use a formal, professional tone. Be respectful, authoritative, and corporate. Avoid casual language and emojis.",
    ),
    (
        ResponseStyle::Official,
        ResponseLanguage::Uk,
        "Використовуйте формальний, професійний тон. Будьте ввічливими, авторитетними та корпоративними. Уникайте розмовної мови та емодзі.",
    ),
    (
        ResponseStyle::Friendly,
        ResponseLanguage::En,
        "Use a warm, approachable, and conversational tone. Be empathetic, personal, and helpful. You can use emojis sparingly.",
    ),
    (
        ResponseStyle::Friendly,
        ResponseLanguage::Uk,
        "Використовуйте теплий, доступний та розмовний тон. Будьте емпатійними, особистими та корисними. Можете помірно використовувати емодзі.",
    ),
    (
        ResponseStyle::Technical,
        ResponseLanguage::En,
        "Use a detailed, solution-focused, and technical tone. Be specific, provide technical details, and focus on problem-solving. Avoid casual language.",
    ),
    (
        ResponseStyle::Technical,
        ResponseLanguage::Uk,
        "Використовуйте детальний, орієнтований на рішення та технічний тон. Будьте конкретними, надавайте технічні деталі та зосередьтеся на вирішенні проблем.",
    ),
];

/// Heading of the block appended for negative mentions only.
pub const NEGATIVE_GUIDELINES_HEADING: &str = "CRITICAL NEGATIVE REVIEW RESPONSE GUIDELINES";

/// The eleven step titles of the negative-review block, in order.
pub const NEGATIVE_GUIDELINE_STEPS: [&str; 11] = [
    "ADDRESS THE REVIEWER",
    "APOLOGIZE SINCERELY",
    "TAKE RESPONSIBILITY",
    "PROVIDE EXPLANATION",
    "THANK THE REVIEWER",
    "OFFER TO MAKE IT RIGHT",
    "PROVIDE ALTERNATIVE CONTACT",
    "RESPOND QUICKLY",
    "DON'T TAKE IT PERSONALLY",
    "OFFER REFUND/DISCOUNT",
    "ASK FOR SECOND CHANCE",
];

static REVIEWER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i:\b(?:review\s+by|posted\s+by|by|from))\s+([A-Z][A-Za-z'-]*(?:\s+[A-Z][A-Za-z'-]*)*)")
        .expect("reviewer name pattern is valid")
});

/// Looks up the tone guide for a style/language pair.
pub fn tone_guide(style: ResponseStyle, language: ResponseLanguage) -> Result<&'static str> {
    TONE_GUIDES
        .iter()
        .find(|(s, l, _)| *s == style && *l == language)
        .map(|(_, _, guide)| *guide)
        .ok_or_else(|| {
            AppError::Configuration(format!(
                "no tone template for style '{style}' in language '{language}'"
            ))
        })
}

pub fn language_directive(language: ResponseLanguage) -> &'static str {
    match language {
        ResponseLanguage::Uk => "IMPORTANT: Respond ONLY in Ukrainian language.",
        ResponseLanguage::En => "IMPORTANT: Respond ONLY in English language.",
    }
}

/// "Great service! Review by Anna Smith" -> `Some("Anna Smith")`.
pub fn extract_reviewer_name(content: &str) -> Option<String> {
    REVIEWER_NAME
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn length_rule(style: ResponseStyle) -> &'static str {
    match style {
        ResponseStyle::Friendly => "2-4 sentences",
        ResponseStyle::Official | ResponseStyle::Technical => "3-5 sentences",
    }
}

/// Renders the user prompt for drafting a reply to `request.mention_content`.
pub fn build_response_prompt(request: &ResponseRequest) -> Result<String> {
    let sentiment = classify(&request.mention_content);
    let guide = tone_guide(request.style, request.language)?;
    let reviewer = extract_reviewer_name(&request.mention_content);

    let mut prompt = format!(
        "You are a professional customer service representative for a brand reputation management system specializing in handling negative reviews.\n\n\
         {directive}\n\n\
         DETECTED SENTIMENT: {sentiment}\n\
         STYLE: {style}\n\
         {guide}\n\n\
         Customer Mention:\n\"{content}\"\n",
        directive = language_directive(request.language),
        sentiment = sentiment.as_str().to_uppercase(),
        style = request.style,
        content = request.mention_content,
    );

    if let Some(name) = &reviewer {
        prompt.push_str(&format!("\n\nREVIEWER NAME: {name}"));
    }

    if let Some(extra) = request.custom_instructions.as_deref().filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("\n\nAdditional Context:\n{extra}\n"));
    }

    if sentiment == Sentiment::Negative {
        let greeting = match &reviewer {
            Some(name) => format!("Use the reviewer's name \"{name}\""),
            None => "Use a personalized greeting (avoid generic \"dear customer\")".to_string(),
        };
        let details = [
            greeting.as_str(),
            "Start with a heartfelt, genuine apology. Even if it wasn't your fault, show you care about their experience.",
            "Acknowledge your business's role without blaming the customer. Be humble and professional.",
            "Explain what went wrong without making excuses. Show you understand the root cause.",
            "Thank them for taking time to provide feedback and helping you improve.",
            "Show specific steps you'll take to resolve their issue and prevent it from happening again.",
            "Offer a direct way to contact you (phone/email) for further discussion.",
            "Acknowledge this is a priority response.",
            "Maintain professional, objective tone even if the review is harsh.",
            "Consider offering appropriate compensation if warranted.",
            "Invite them back to give you another opportunity to serve them better.",
        ];

        prompt.push_str(&format!(
            "\n\n{NEGATIVE_GUIDELINES_HEADING}:\nYou MUST follow these 11 essential steps for negative review responses:\n"
        ));
        for (i, (step, detail)) in NEGATIVE_GUIDELINE_STEPS.iter().zip(details).enumerate() {
            prompt.push_str(&format!("\n{}. {}: {}\n", i + 1, step, detail));
        }
        prompt.push_str(
            "\nRESPONSE REQUIREMENTS:\n\
             - Length: 4-6 sentences for negative reviews (more detailed than positive)\n\
             - Tone: Empathetic, professional, solution-focused\n\
             - Include: Personalization, apology, explanation, solution, contact info, second chance offer\n\
             - Avoid: Defensive language, excuses, generic responses, taking it personally\n\n\
             RESPONSE:",
        );
    } else {
        prompt.push_str(&format!(
            "\n\nPlease provide:\n\
             1. A well-crafted response that addresses the customer's concern\n\
             2. Be empathetic and solution-oriented\n\
             3. Keep the response concise ({})\n\
             4. Make it sound natural and human\n\n\
             RESPONSE:",
            length_rule(request.style)
        ));
    }

    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str, style: ResponseStyle, language: ResponseLanguage) -> ResponseRequest {
        ResponseRequest {
            mention_id: "m-1".into(),
            mention_content: content.into(),
            style,
            language,
            custom_instructions: None,
        }
    }

    #[test]
    fn every_style_language_pair_has_a_guide() {
        for style in ResponseStyle::ALL {
            for language in ResponseLanguage::ALL {
                assert!(tone_guide(style, language).is_ok(), "{style}/{language}");
            }
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let mut req = request("Posted by Olena: the app is slow", ResponseStyle::Official, ResponseLanguage::Uk);
        req.custom_instructions = Some("Mention the 2.1 release".into());
        assert_eq!(build_response_prompt(&req).unwrap(), build_response_prompt(&req).unwrap());
    }

    #[test]
    fn negative_prompt_contains_all_guidelines() {
        let req = request(
            "This app is terrible and support never replies",
            ResponseStyle::Technical,
            ResponseLanguage::En,
        );
        let prompt = build_response_prompt(&req).unwrap();

        assert!(prompt.contains("DETECTED SENTIMENT: NEGATIVE"));
        assert!(prompt.contains(NEGATIVE_GUIDELINES_HEADING));
        for (i, step) in NEGATIVE_GUIDELINE_STEPS.iter().enumerate() {
            assert!(prompt.contains(&format!("{}. {}", i + 1, step)), "missing {step}");
        }
        assert!(prompt.contains("4-6 sentences"));
        assert!(prompt.contains("personalized greeting"));
    }

    #[test]
    fn non_negative_prompt_omits_guidelines() {
        let req = request("Amazing support, thank you!", ResponseStyle::Friendly, ResponseLanguage::En);
        let prompt = build_response_prompt(&req).unwrap();

        assert!(prompt.contains("DETECTED SENTIMENT: POSITIVE"));
        assert!(!prompt.contains(NEGATIVE_GUIDELINES_HEADING));
        assert!(!prompt.contains("4-6 sentences"));
        assert!(prompt.contains("2-4 sentences"));

        let official = request("The parcel arrived", ResponseStyle::Official, ResponseLanguage::En);
        assert!(build_response_prompt(&official).unwrap().contains("3-5 sentences"));
    }

    #[test]
    fn language_directive_is_always_present() {
        let uk = request("Great app", ResponseStyle::Friendly, ResponseLanguage::Uk);
        let prompt = build_response_prompt(&uk).unwrap();
        assert!(prompt.contains("Respond ONLY in Ukrainian language."));
        assert!(prompt.contains(tone_guide(ResponseStyle::Friendly, ResponseLanguage::Uk).unwrap()));

        let en = request("Great app", ResponseStyle::Friendly, ResponseLanguage::En);
        assert!(build_response_prompt(&en).unwrap().contains("Respond ONLY in English language."));
    }

    #[test]
    fn reviewer_name_is_extracted_when_present() {
        assert_eq!(extract_reviewer_name("Review by Anna Smith"), Some("Anna Smith".into()));
        assert_eq!(extract_reviewer_name("posted by Taras: awful"), Some("Taras".into()));
        assert_eq!(extract_reviewer_name("Greetings from Lviv"), Some("Lviv".into()));
        assert_eq!(extract_reviewer_name("written by someone"), None);
        assert_eq!(extract_reviewer_name("nearby Shop"), None);

        let req = request("Worst service ever. Review by Anna", ResponseStyle::Official, ResponseLanguage::En);
        let prompt = build_response_prompt(&req).unwrap();
        assert!(prompt.contains("REVIEWER NAME: Anna"));
        assert!(prompt.contains("Use the reviewer's name \"Anna\""));
    }

    #[test]
    fn custom_instructions_are_appended_verbatim() {
        let mut req = request("ok", ResponseStyle::Technical, ResponseLanguage::En);
        req.custom_instructions = Some("Reference ticket #4411".into());
        let prompt = build_response_prompt(&req).unwrap();
        assert!(prompt.contains("Additional Context:\nReference ticket #4411\n"));
    }
}
