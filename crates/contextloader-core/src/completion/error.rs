//! Completion service error types

use thiserror::Error;

/// Errors that can occur while asking the model for a completion
#[derive(Error, Debug)]
pub enum CompletionError {
    /// API request failed
    #[error("{service} API error: {message}")]
    ApiError { service: String, message: String },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid response from the service
    #[error("Invalid response from {service}: {message}")]
    InvalidResponse { service: String, message: String },

    /// Scripted or mocked failure
    #[error("{0}")]
    Other(String),
}

impl CompletionError {
    /// Create an API error
    pub fn api_error(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiError {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service: service.into(),
            message: message.into(),
        }
    }
}

pub type CompletionResult<T> = Result<T, CompletionError>;
