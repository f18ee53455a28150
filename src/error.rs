//! Unified API error handling.
//!
//! Maps the core failure taxonomies onto HTTP statuses once, here:
//! unauthorized/unconfigured generative failures surface as internal
//! errors, rate limiting as 429, provider overload as 503. Parse
//! failures are treated identically to gateway failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::{DiscoveryError, GenerativeError};
use crate::summary::{ParseFailure, SummarizeError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded. Please try again later.")]
    TooManyRequests,

    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Non-success bodies carry a single human-readable `error` field.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Conflict(msg) => msg.clone(),
            Self::TooManyRequests => self.to_string(),
            Self::ServiceUnavailable(msg) => msg.clone(),
            // Don't leak internal error details
            Self::Internal(_) => "Failed to generate summary".to_string(),
        }
    }
}

impl From<GenerativeError> for ApiError {
    fn from(e: GenerativeError) -> Self {
        match e {
            GenerativeError::RateLimited => Self::TooManyRequests,
            GenerativeError::Overloaded => Self::ServiceUnavailable(
                "The summarization service is temporarily overloaded. Please try again.".into(),
            ),
            GenerativeError::Unconfigured
            | GenerativeError::Unauthorized
            | GenerativeError::Malformed
            | GenerativeError::Transport(_)
            | GenerativeError::Unknown { .. } => Self::Internal(e.into()),
        }
    }
}

impl From<ParseFailure> for ApiError {
    fn from(e: ParseFailure) -> Self {
        Self::Internal(e.into())
    }
}

impl From<SummarizeError> for ApiError {
    fn from(e: SummarizeError) -> Self {
        match e {
            SummarizeError::Gateway(g) => g.into(),
            SummarizeError::Parse(p) => p.into(),
        }
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::HttpError { message, .. } => Self::ServiceUnavailable(message),
            DiscoveryError::Cancelled
            | DiscoveryError::InvalidResponse { .. }
            | DiscoveryError::Transport(_) => Self::ServiceUnavailable(
                "Failed to reach the civic data service. Please try again.".into(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Internal server error");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
