//! MCP client using the official rmcp SDK
//!
//! Spawns each tool server as a child process and speaks MCP over its
//! stdio.

use async_trait::async_trait;
use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
        RawContent, Tool,
    },
    service::RunningService,
    transport::{ConfigureCommandExt, TokioChildProcess},
    RoleClient, ServiceExt,
};
use serde_json::Value;
use tokio::process::Command;

use crate::logging::Logger;
use crate::providers::{
    CallOutcome, ProviderError, ProviderResult, SessionConnector, ToolSession,
};
use crate::types::{LaunchSpec, ToolDefinition};
use crate::{log_debug, log_info, log_warn};

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "contextloader".to_string(),
            title: Some("Context Loader".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// Opens MCP sessions by spawning the launch spec's command
pub struct McpConnector {
    logger: Arc<dyn Logger>,
}

impl McpConnector {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl SessionConnector for McpConnector {
    async fn connect(
        &self,
        provider: &str,
        spec: &LaunchSpec,
    ) -> ProviderResult<Box<dyn ToolSession>> {
        let (env, missing) = spec.resolve_env(|var| std::env::var(var).ok());
        for key in &missing {
            log_warn!(
                self.logger,
                "[McpConnector] '{}': environment variable for {} is not set, skipping",
                provider,
                key
            );
        }

        let args = spec.args.clone();
        let transport = TokioChildProcess::new(Command::new(&spec.command).configure(move |cmd| {
            cmd.args(&args);
            for (key, value) in &env {
                cmd.env(key, value);
            }
        }))
        .map_err(|e| ProviderError::init_failed(provider, format!("failed to spawn '{}': {}", spec.command, e)))?;

        let service = client_info()
            .serve(transport)
            .await
            .map_err(|e| ProviderError::init_failed(provider, e.to_string()))?;

        if let Some(info) = service.peer_info() {
            log_info!(
                self.logger,
                "[McpConnector] '{}' connected to {} {}",
                provider,
                info.server_info.name,
                info.server_info.version
            );
        }

        Ok(Box::new(McpSession {
            provider: provider.to_string(),
            service,
            logger: Arc::clone(&self.logger),
        }))
    }
}

/// An initialized MCP session
pub struct McpSession {
    provider: String,
    service: RunningService<RoleClient, ClientInfo>,
    logger: Arc<dyn Logger>,
}

#[async_trait]
impl ToolSession for McpSession {
    async fn list_tools(&self) -> ProviderResult<Vec<ToolDefinition>> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|e| ProviderError::protocol(&self.provider, e.to_string()))?;

        log_info!(
            self.logger,
            "[McpSession] '{}' listed {} tools",
            self.provider,
            tools.len()
        );
        Ok(tools.into_iter().map(tool_definition).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ProviderResult<CallOutcome> {
        log_debug!(self.logger, "[McpSession] '{}' calling {}", self.provider, name);

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        let result = self
            .service
            .call_tool(params)
            .await
            .map_err(|e| ProviderError::protocol(&self.provider, e.to_string()))?;

        Ok(call_outcome(result))
    }

    async fn shutdown(self: Box<Self>) -> ProviderResult<()> {
        let provider = self.provider.clone();
        self.service
            .cancel()
            .await
            .map_err(|e| ProviderError::protocol(provider, e.to_string()))?;
        Ok(())
    }
}

/// Convert an MCP tool descriptor
pub fn tool_definition(tool: Tool) -> ToolDefinition {
    // input_schema is Arc<JsonObject>
    let parameters = Value::Object(tool.input_schema.as_ref().clone());
    ToolDefinition::new(
        tool.name.to_string(),
        tool.description.map(|d| d.to_string()).unwrap_or_default(),
    )
    .with_parameters(parameters)
}

/// Join the text parts of a call result
pub fn call_outcome(result: CallToolResult) -> CallOutcome {
    let text = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    CallOutcome {
        text,
        is_error: result.is_error.unwrap_or(false),
    }
}
