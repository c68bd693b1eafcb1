//! Timeout-bounded access to the LLM port.

use rp_core::{AppError, CompletionRequest, LlmProvider};
use std::time::Duration;

/// Default upper bound on a single completion call.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a bounded completion call, before the caller maps it to its own error.
#[derive(Debug)]
pub enum CallFailure {
    TimedOut(AppError),
    Provider(anyhow::Error),
}

/// Runs `request` against `llm`, giving up after `timeout`.
pub async fn complete_within(
    llm: &dyn LlmProvider,
    request: &CompletionRequest,
    timeout: Duration,
    operation: &str,
) -> Result<Option<String>, CallFailure> {
    match tokio::time::timeout(timeout, llm.complete(request)).await {
        Ok(Ok(content)) => Ok(content),
        Ok(Err(err)) => Err(CallFailure::Provider(err)),
        Err(_) => Err(CallFailure::TimedOut(AppError::Timeout {
            operation: operation.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })),
    }
}
