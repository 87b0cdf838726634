//! Error types for outbound API calls.

use qbot_core::DecodeError;
use thiserror::Error;

/// Errors returned by [`MessageApi`](crate::MessageApi) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status} error: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] DecodeError),

    /// A request URL could not be built.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(DecodeError::Json(err))
    }
}

impl ApiError {
    /// Returns the HTTP status for [`ApiError::Status`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
