//! Upstream transport errors
//!
//! Classifies HTTP outcomes so the retry policy can decide which failures
//! are worth another attempt.

use thiserror::Error;

/// Errors from the Congress.gov and Senate.gov clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, url: &str, body: String) -> Self {
        match status {
            404 => ApiError::NotFound(url.to_string()),
            403 => ApiError::Forbidden(url.to_string()),
            429 => ApiError::RateLimited,
            _ => ApiError::Status(status, body),
        }
    }

    /// Server-side and connection failures that may succeed on retry
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Forbidden(_) => true,
            ApiError::Status(code, _) => *code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

impl From<ApiError> for congress_common::Error {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::NotFound(what) => congress_common::Error::NotFound(what),
            other => congress_common::Error::Http(other.to_string()),
        }
    }
}
