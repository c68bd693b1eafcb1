//! HTTP mapping of [`AppError`].

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use rp_core::AppError;
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    retryable: bool,
}

/// Wraps [`AppError`] so it can be returned from handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Generation(_) | AppError::InsightGeneration(_) | AppError::Upstream(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.0.to_string(),
            retryable: self.0.is_retryable(),
        })
    }
}
