//! # AppError
//!
//! Centralized error handling for the repute services.
//! Every failure is local: nothing here triggers a retry, callers decide.

use thiserror::Error;

/// The primary error type for all service operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// A (style, language) pair with no tone template
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Response drafting failed; the message is shown to the user as-is
    #[error("{0}")]
    Generation(String),

    /// Dashboard insight generation or parsing failed
    #[error("{0}")]
    InsightGeneration(String),

    /// The LLM provider did not answer in time
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Another generation for the same target is still in flight
    #[error("conflict: {0}")]
    Conflict(String),

    /// The analytics backend failed a write the caller asked for
    #[error("backend error: {0}")]
    Upstream(String),

    /// Resource not found (e.g., Mention)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Malformed input (e.g., empty mention text)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Infrastructure failure (e.g., cache directory unwritable)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether re-issuing the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Timeout { .. }
                | AppError::Conflict(_)
                | AppError::Generation(_)
                | AppError::InsightGeneration(_)
                | AppError::Upstream(_)
        )
    }
}

/// A specialized Result type for repute logic.
pub type Result<T> = std::result::Result<T, AppError>;
