use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const MISSING_QUESTION_MESSAGE: &str = "No question provided";
pub const QUOTA_MESSAGE: &str = "Rate limit exceeded. Try again later.";
pub const UPSTREAM_MESSAGE: &str = "Failed to get a response from the AI service";

/// Failures talking to the generative-language API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream unreachable: {0}")]
    Network(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        // the request url carries the api key
        let err = err.without_url();
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

/// Outcome of a rejected relay request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("authorization header missing or wrong")]
    Unauthorized,

    #[error("quota exhausted, retry in {retry_after:?}")]
    QuotaExceeded { retry_after: Duration },

    #[error("request carried no question")]
    MissingQuestion,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RelayError {
    /// Short label used for logs and the rejection counter.
    pub fn reason(&self) -> &'static str {
        match self {
            RelayError::Unauthorized => "unauthorized",
            RelayError::QuotaExceeded { .. } => "quota",
            RelayError::MissingQuestion => "validation",
            RelayError::Upstream(_) => "upstream",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message, retry_after) = match &self {
            RelayError::Unauthorized => (StatusCode::FORBIDDEN, UNAUTHORIZED_MESSAGE, None),
            RelayError::QuotaExceeded { retry_after } => {
                (StatusCode::TOO_MANY_REQUESTS, QUOTA_MESSAGE, Some(*retry_after))
            }
            RelayError::MissingQuestion => (StatusCode::BAD_REQUEST, MISSING_QUESTION_MESSAGE, None),
            // upstream detail stays in the logs
            RelayError::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_MESSAGE, None),
        };

        let mut res = (
            status,
            Json(ErrorBody {
                error: message.to_string(),
            }),
        )
            .into_response();

        if let Some(wait) = retry_after {
            res.headers_mut()
                .insert(header::RETRY_AFTER, retry_after_secs(wait).into());
        }

        res
    }
}

// Whole seconds, rounded up, never zero
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

/// Startup failures; any of these aborts the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: set one of {}", .0.join(", "))]
    MissingEnv(&'static [&'static str]),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
