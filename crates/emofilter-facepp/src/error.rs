//! Face++ client error types.

use thiserror::Error;

/// Result type for Face++ operations.
pub type FppResult<T> = Result<T, FppError>;

/// Errors that can occur while classifying photos.
#[derive(Debug, Error)]
pub enum FppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Face++ returned {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Rate limited by Face++: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FppError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Map a non-success HTTP status to an error.
    ///
    /// Face++ reports throttling as 403 with `CONCURRENCY_LIMIT_EXCEEDED`.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 429 || message.contains("CONCURRENCY_LIMIT_EXCEEDED") {
            return Self::RateLimited(message);
        }
        Self::RequestFailed { status, message }
    }

    /// HTTP status carried by the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FppError::RequestFailed { status, .. } => Some(*status),
            FppError::RateLimited(_) => Some(429),
            FppError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if error is retryable.
    ///
    /// The resolver never retries on its own; this is for callers that wrap it.
    pub fn is_retryable(&self) -> bool {
        match self {
            FppError::Network(_) | FppError::RateLimited(_) => true,
            FppError::RequestFailed { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
