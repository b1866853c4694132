use thiserror::Error;

use crate::agora::access_token::AccessTokenError;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    EmptyResult(String),

    #[error("Gemini service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Failed to access Gemini API: {0}")]
    UpstreamFailure(String),

    #[error("{0}")]
    Unexpected(String),
}

impl HandlerError {
    /// HTTP status code reported to the caller for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            HandlerError::InvalidRequest(_) => 400,
            HandlerError::UpstreamUnavailable(_) => 503,
            HandlerError::Configuration(_)
            | HandlerError::EmptyResult(_)
            | HandlerError::UpstreamFailure(_)
            | HandlerError::Unexpected(_) => 500,
        }
    }

    /// Whether the caller may retry the same request later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, HandlerError::UpstreamUnavailable(_))
    }
}

impl From<AccessTokenError> for HandlerError {
    fn from(error: AccessTokenError) -> Self {
        HandlerError::Unexpected(format!("Failed to build access token: {error}"))
    }
}

impl From<reqwest::Error> for HandlerError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            HandlerError::UpstreamUnavailable(error.to_string())
        } else {
            HandlerError::UpstreamFailure(error.to_string())
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        HandlerError::UpstreamFailure(format!("malformed response: {error}"))
    }
}
