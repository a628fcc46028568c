//! Tool bindings: a definition plus the capability that runs it

use serde_json::Value;
use std::sync::Arc;

use super::error::ToolError;
use super::local::LocalTool;
use crate::providers::RemoteProvider;
use crate::types::ToolDefinition;

/// How a bound tool is executed
#[derive(Clone)]
pub enum ToolHandler {
    /// Runs in process
    Local(Arc<dyn LocalTool>),
    /// Proxied through a remote provider's session
    Remote(Arc<RemoteProvider>),
}

/// A registered tool
#[derive(Clone)]
pub struct ToolBinding {
    pub definition: ToolDefinition,
    pub handler: ToolHandler,
    /// Owning provider (None for local tools)
    pub provider: Option<String>,
}

impl ToolBinding {
    /// Bind an in-process tool
    pub fn local(tool: Arc<dyn LocalTool>) -> Self {
        Self {
            definition: tool.definition(),
            handler: ToolHandler::Local(tool),
            provider: None,
        }
    }

    /// Bind a tool served by a remote provider
    pub fn remote(definition: ToolDefinition, provider: Arc<RemoteProvider>) -> Self {
        let owner = provider.name().to_string();
        Self {
            definition,
            handler: ToolHandler::Remote(provider),
            provider: Some(owner),
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Run the tool and return its text
    ///
    /// A remote result flagged as an error by the server comes back as
    /// `ToolError::Execution` carrying the server's text.
    pub async fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        match &self.handler {
            ToolHandler::Local(tool) => tool.invoke(arguments).await,
            ToolHandler::Remote(provider) => {
                let outcome = provider.call_tool(&self.definition.name, arguments).await?;
                if outcome.is_error {
                    Err(ToolError::Execution(outcome.text))
                } else {
                    Ok(outcome.text)
                }
            }
        }
    }
}

impl std::fmt::Debug for ToolBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.handler {
            ToolHandler::Local(_) => "local",
            ToolHandler::Remote(_) => "remote",
        };
        f.debug_struct("ToolBinding")
            .field("name", &self.definition.name)
            .field("kind", &kind)
            .field("provider", &self.provider)
            .finish()
    }
}
