//! Tool execution error types

use thiserror::Error;

use crate::providers::ProviderError;

/// Errors raised while running a tool
///
/// The dispatcher turns every variant into tool-result text.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool ran and reported a failure
    #[error("{0}")]
    Execution(String),

    /// The arguments did not satisfy the tool's schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The owning provider could not serve the call
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ToolError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}
