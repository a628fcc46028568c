//! Session seam between a remote provider and its transport

use async_trait::async_trait;
use serde_json::Value;

use super::error::ProviderResult;
use crate::types::{LaunchSpec, ToolDefinition};

/// Text returned by a remote tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub text: String,
    /// The server flagged the result as an error
    pub is_error: bool,
}

impl CallOutcome {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// An established session with a remote tool server
///
/// Callers serialize access; implementations need not support concurrent
/// requests.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Enumerate the server's tools
    async fn list_tools(&self) -> ProviderResult<Vec<ToolDefinition>>;

    /// Invoke one tool
    async fn call_tool(&self, name: &str, arguments: Value) -> ProviderResult<CallOutcome>;

    /// End the session and release the server process
    async fn shutdown(self: Box<Self>) -> ProviderResult<()>;
}

/// Opens sessions from launch specs
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Start the server for `provider` and complete the handshake
    async fn connect(&self, provider: &str, spec: &LaunchSpec)
        -> ProviderResult<Box<dyn ToolSession>>;
}
