//! Capability provider error types

use thiserror::Error;

/// Errors raised by a provider's lifecycle or session
///
/// None of these terminate the conversation: init failures are isolated to
/// the provider, call failures become tool-result text.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Spawning the server or the protocol handshake failed
    #[error("Provider '{provider}' failed to initialize: {message}")]
    InitFailed { provider: String, message: String },

    /// Initialization did not finish within the configured bound
    #[error("Provider '{provider}' did not initialize within {secs}s")]
    Timeout { provider: String, secs: u64 },

    /// Operation requires a Ready provider
    #[error("Provider '{provider}' is not ready (state: {state})")]
    NotReady { provider: String, state: String },

    /// A request over an established session failed
    #[error("Provider '{provider}' protocol error: {message}")]
    Protocol { provider: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    /// Create an init failure
    pub fn init_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InitFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
