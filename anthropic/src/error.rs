//! Error types for the Anthropic API client

use thiserror::Error;

/// Errors that can occur when interacting with the Anthropic API
#[derive(Debug, Error)]
pub enum ClaudeError {
    /// Missing `ANTHROPIC_API_KEY` environment variable
    #[error("Missing ANTHROPIC_API_KEY environment variable")]
    MissingApiKey,

    /// The HTTP client could not be built
    #[error("Client configuration failed: {0}")]
    ClientBuild(String),

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Rate limited - too many requests
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Unauthorized - invalid API key
    #[error("Unauthorized - invalid API key")]
    Unauthorized,

    /// API returned an error
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },
}

impl From<reqwest::Error> for ClaudeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::ResponseParseFailed(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}
