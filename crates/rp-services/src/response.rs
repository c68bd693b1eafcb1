//! # Response Generation Service
//!
//! Classifies a mention, renders the prompt, asks the LLM for a draft and attaches
//! the rule-based checklist and support links.

use chrono::Utc;
use rp_core::{AppError, CompletionRequest, GeneratedResponse, LlmProvider, ResponseRequest, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::checklist::{action_checklist, faq_links};
use crate::inflight::InFlight;
use crate::llm::{complete_within, CallFailure, DEFAULT_LLM_TIMEOUT};
use crate::prompt::build_response_prompt;
use crate::sentiment::classify;

pub const RESPONSE_SYSTEM_PROMPT: &str = "You are a professional customer service expert specializing in brand reputation management and negative review recovery. You excel at turning unhappy customers into loyal advocates through empathetic, solution-focused responses. You follow proven best practices for addressing customer complaints and always maintain a professional, humble, and caring tone.";

/// User-facing message for any failed draft.
pub const GENERATION_FAILED: &str =
    "Failed to generate response. Please check your OpenAI API key.";

#[derive(Debug, Clone)]
pub struct ResponseOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// When false, a completion without text is reported as a generation failure.
    pub allow_empty_completion: bool,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
            timeout: DEFAULT_LLM_TIMEOUT,
            allow_empty_completion: true,
        }
    }
}

pub struct ResponseService {
    llm: Arc<dyn LlmProvider>,
    options: ResponseOptions,
    in_flight: InFlight,
}

impl ResponseService {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self::with_options(llm, ResponseOptions::default())
    }

    pub fn with_options(llm: Arc<dyn LlmProvider>, options: ResponseOptions) -> Self {
        Self {
            llm,
            options,
            in_flight: InFlight::new(),
        }
    }

    /// Drafts a reply. One draft per mention may be in flight at a time.
    pub async fn generate(&self, request: &ResponseRequest) -> Result<GeneratedResponse> {
        let _guard = self.in_flight.try_begin(&request.mention_id).ok_or_else(|| {
            AppError::Conflict(format!(
                "a response for mention {} is already being generated",
                request.mention_id
            ))
        })?;

        let sentiment = classify(&request.mention_content);
        let prompt = build_response_prompt(request)?;
        debug!(mention_id = %request.mention_id, %sentiment, style = %request.style, language = %request.language, "built response prompt");

        let completion = CompletionRequest {
            system: RESPONSE_SYSTEM_PROMPT.to_string(),
            user: prompt,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
            json_mode: false,
        };

        let content = match complete_within(
            self.llm.as_ref(),
            &completion,
            self.options.timeout,
            "response generation",
        )
        .await
        {
            Ok(content) => content.unwrap_or_default(),
            Err(CallFailure::TimedOut(err)) => {
                warn!(mention_id = %request.mention_id, "response generation timed out");
                return Err(err);
            }
            Err(CallFailure::Provider(err)) => {
                error!(mention_id = %request.mention_id, error = %err, "response generation failed");
                return Err(AppError::Generation(GENERATION_FAILED.to_string()));
            }
        };

        if content.is_empty() {
            if !self.options.allow_empty_completion {
                warn!(mention_id = %request.mention_id, "provider returned an empty completion");
                return Err(AppError::Generation(GENERATION_FAILED.to_string()));
            }
            debug!(mention_id = %request.mention_id, "accepting empty completion");
        }

        let response = GeneratedResponse {
            id: format!("response-{}", Uuid::now_v7()),
            mention_id: request.mention_id.clone(),
            style: request.style,
            language: request.language,
            content,
            action_checklist: action_checklist(sentiment, request.custom_instructions.as_deref()),
            faq_links: faq_links(sentiment),
            created_at: Utc::now(),
        };
        info!(response_id = %response.id, mention_id = %response.mention_id, %sentiment, "response generated");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::{NEGATIVE_ACTIONS, POSITIVE_ACTIONS};
    use async_trait::async_trait;
    use rp_core::{MockLlmProvider, ResponseLanguage, ResponseStyle};

    fn request(content: &str, style: ResponseStyle) -> ResponseRequest {
        ResponseRequest {
            mention_id: "m-1".into(),
            mention_content: content.into(),
            style,
            language: ResponseLanguage::En,
            custom_instructions: None,
        }
    }

    fn answering(text: Option<&'static str>) -> Arc<dyn LlmProvider> {
        let mut llm = MockLlmProvider::new();
        llm.expect_complete()
            .returning(move |_| Ok(text.map(str::to_string)));
        Arc::new(llm)
    }

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<Option<String>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some("late".into()))
        }
    }

    #[tokio::test]
    async fn negative_mention_gets_full_checklist() {
        let mut llm = MockLlmProvider::new();
        llm.expect_complete()
            .withf(|req| {
                req.system == RESPONSE_SYSTEM_PROMPT
                    && (req.temperature - 0.7).abs() < f32::EPSILON
                    && req.max_tokens == 500
                    && !req.json_mode
                    && req.user.contains("DETECTED SENTIMENT: NEGATIVE")
            })
            .times(1)
            .returning(|_| Ok(Some("We are sorry.".into())));
        let service = ResponseService::new(Arc::new(llm));

        let response = service
            .generate(&request("This app is terrible and support never replies", ResponseStyle::Technical))
            .await
            .unwrap();

        assert_eq!(response.content, "We are sorry.");
        assert_eq!(response.style, ResponseStyle::Technical);
        assert_eq!(response.language, ResponseLanguage::En);
        assert_eq!(response.faq_links.len(), 3);
        for action in NEGATIVE_ACTIONS {
            assert!(response.action_checklist.iter().any(|a| a == action));
        }
    }

    #[tokio::test]
    async fn positive_mention_gets_positive_actions() {
        let service = ResponseService::new(answering(Some("Thanks!")));
        let response = service
            .generate(&request("Amazing support, thank you!", ResponseStyle::Friendly))
            .await
            .unwrap();

        assert_eq!(response.faq_links.len(), 2);
        for action in POSITIVE_ACTIONS {
            assert!(response.action_checklist.iter().any(|a| a == action));
        }
    }

    #[tokio::test]
    async fn every_call_gets_a_new_id() {
        let service = ResponseService::new(answering(Some("ok")));
        let req = request("fine", ResponseStyle::Official);
        let first = service.generate(&req).await.unwrap();
        let second = service.generate(&req).await.unwrap();
        assert_ne!(first.id, second.id);
        assert!(first.id.starts_with("response-"));
    }

    #[tokio::test]
    async fn missing_completion_is_blank_by_default() {
        let service = ResponseService::new(answering(None));
        let response = service.generate(&request("fine", ResponseStyle::Official)).await.unwrap();
        assert_eq!(response.content, "");
    }

    #[tokio::test]
    async fn missing_completion_can_be_rejected() {
        let options = ResponseOptions {
            allow_empty_completion: false,
            ..ResponseOptions::default()
        };
        let service = ResponseService::with_options(answering(Some("")), options);
        let err = service.generate(&request("fine", ResponseStyle::Official)).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn provider_failure_becomes_generation_error() {
        let mut llm = MockLlmProvider::new();
        llm.expect_complete()
            .returning(|_| Err(anyhow::anyhow!("401 invalid api key")));
        let service = ResponseService::new(Arc::new(llm));

        let err = service.generate(&request("bad", ResponseStyle::Official)).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
        assert_eq!(err.to_string(), GENERATION_FAILED);
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let options = ResponseOptions {
            timeout: Duration::from_millis(20),
            ..ResponseOptions::default()
        };
        let service = ResponseService::with_options(Arc::new(SlowProvider), options);

        let err = service.generate(&request("bad", ResponseStyle::Official)).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout { timeout_ms: 20, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn concurrent_request_for_same_mention_is_rejected() {
        let mut llm = MockLlmProvider::new();
        llm.expect_complete().never();
        let service = ResponseService::new(Arc::new(llm));

        let _busy = service.in_flight.try_begin("m-1").unwrap();
        let err = service.generate(&request("bad", ResponseStyle::Official)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
